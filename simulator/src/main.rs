//! Simulator process entry point
//!
//! Runs one simulation with its control plane: a status endpoint on the first
//! free port of the status range and, when a dispatcher is configured,
//! periodic progress reports plus a completion report.

use anyhow::Context;
use chrono::NaiveDate;
use clap::Parser;
use std::net::IpAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::signal;
use tokio_util::sync::CancellationToken;

use shared::{PortRange, ProcessId, STATUS_BASE_PORT, STATUS_MAX_PORT, logging, process_debug, process_info};
use simulator::{
    ControlPlaneConfig, DispatcherReporter, HostProfile, HttpDispatchTransport, PacedEngine, PortAllocator,
    ReportOutcome, SimulationProfile, SimulationRunner, SimulationState, StatusEndpoint,
};

const DISPATCH_TIMEOUT: Duration = Duration::from_secs(30);

/// Simulation process with a status endpoint and dispatcher reporting
#[derive(Parser, Debug)]
#[command(name = "simulator")]
#[command(about = "Runs a simulation and exposes its progress over HTTP")]
struct Args {
    /// Simulation ID assigned by the dispatcher (0 when standalone)
    #[arg(long, env = "SIMULATOR_SID", default_value = "0")]
    sid: i64,

    /// Dispatcher base URL; progress is reported to `{dispatcher}command`
    #[arg(long, env = "SIMULATOR_DISPATCHER")]
    dispatcher: Option<String>,

    /// Do not start the status endpoint
    #[arg(long)]
    notalk: bool,

    /// Seconds between progress reports to the dispatcher
    #[arg(long, env = "SIMULATOR_REPORT_INTERVAL_SECS", default_value = "300")]
    report_interval_secs: u64,

    /// First port tried for the status endpoint
    #[arg(long, default_value_t = STATUS_BASE_PORT)]
    base_port: u16,

    /// Last port tried for the status endpoint
    #[arg(long, default_value_t = STATUS_MAX_PORT)]
    max_port: u16,

    /// Address the status endpoint binds to
    #[arg(long, env = "SIMULATOR_BIND_HOST", default_value = "0.0.0.0")]
    bind_host: IpAddr,

    /// Simulation configuration file, shown in status
    #[arg(long, env = "SIMULATOR_CONFIG_FILE", default_value = "simulation.json5")]
    config_file: String,

    /// First simulated day (YYYY-MM-DD)
    #[arg(long, default_value = "2020-01-01")]
    start: NaiveDate,

    /// Last simulated day (YYYY-MM-DD)
    #[arg(long, default_value = "2020-12-31")]
    stop: NaiveDate,

    /// Population size per generation
    #[arg(long, default_value = "100")]
    population: u32,

    /// Number of loops
    #[arg(long, default_value = "1")]
    loops: u32,

    /// Generations per loop
    #[arg(long, default_value = "100")]
    generations: u32,

    /// Wall-clock milliseconds spent per generation
    #[arg(long, default_value = "1000")]
    generation_ms: u64,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "SIMULATOR_LOG_LEVEL", default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    let args = Args::parse();

    // Initialize process ID singleton for this simulation
    ProcessId::init_simulator(args.sid);
    logging::init_tracing_with_level(Some(&args.log_level));
    logging::log_startup(ProcessId::current(), &format!("simulator (SID {})", args.sid));

    let profile = SimulationProfile::new(
        args.config_file.clone(),
        args.start,
        args.stop,
        args.population,
        args.loops,
        args.generations,
    )?;
    let host = HostProfile::detect();
    process_debug!(
        ProcessId::current(),
        "Host {}: {} CPUs, {}, {}",
        host.host_name,
        host.cpus,
        host.memory,
        host.cpu_architecture
    );
    let config = ControlPlaneConfig {
        status_range: PortRange::new(args.base_port, args.max_port)?,
        bind_host: args.bind_host,
        talk: !args.notalk,
        dispatcher: args.dispatcher.clone(),
        report_interval: Duration::from_secs(args.report_interval_secs),
    };
    let working_directory = std::env::current_dir()
        .map(|dir| dir.display().to_string())
        .unwrap_or_default();
    let state = Arc::new(SimulationState::new(args.sid, profile, host, working_directory));

    // Root lifecycle signal
    let shutdown = CancellationToken::new();
    {
        let shutdown = shutdown.clone();
        tokio::spawn(async move {
            match signal::ctrl_c().await {
                Ok(()) => {
                    logging::log_shutdown(ProcessId::current(), "Received Ctrl+C signal");
                    shutdown.cancel();
                }
                Err(err) => logging::log_error(ProcessId::current(), "Signal handling", &err),
            }
        });
    }

    let endpoint_task = if !config.talk {
        process_info!(ProcessId::current(), "🔇 Status endpoint disabled");
        None
    } else {
        let (listener, port) = PortAllocator::new(config.bind_host, config.status_range)
            .acquire(&shutdown)
            .await
            .context("Cannot start status endpoint")?;
        state
            .set_status_url(format!("http://{}:{}", state.host.host_name, port))
            .await;

        let endpoint = StatusEndpoint::new(state.clone());
        let token = shutdown.clone();
        Some(tokio::spawn(async move { endpoint.serve(listener, token).await }))
    };

    let reporter = match config.reporting_target(args.sid) {
        Some(dispatcher) => {
            let transport = HttpDispatchTransport::new(DISPATCH_TIMEOUT)?;
            Some(Arc::new(DispatcherReporter::new(transport, dispatcher, state.clone())?))
        }
        None => {
            if config.dispatcher.is_some() {
                process_info!(ProcessId::current(), "📭 No simulation ID, dispatcher reporting disabled");
            }
            None
        }
    };

    let reporting = shutdown.child_token();
    let periodic = reporter.clone().map(|reporter| {
        let every = config.report_interval;
        let token = reporting.clone();
        tokio::spawn(async move { reporter.run_periodic(every, token).await })
    });

    let engine = PacedEngine::new(Duration::from_millis(args.generation_ms));
    let mut runner = SimulationRunner::new(state.clone(), engine, shutdown.clone());
    let summary = runner.run().await;

    reporting.cancel();
    if let Some(task) = periodic {
        task.await?;
    }

    match &summary {
        Ok(summary) if !summary.interrupted => {
            logging::log_success(
                ProcessId::current(),
                &format!("Simulation complete after {} generations", summary.generations_completed),
            );
            if let Some(reporter) = &reporter {
                match reporter.report(Some(summary.finished_at)).await {
                    Ok(ReportOutcome::Sent { acknowledged: true }) => {
                        logging::log_success(ProcessId::current(), "Dispatcher acknowledged completion");
                    }
                    Ok(_) => {}
                    Err(e) => logging::log_error(ProcessId::current(), "Completion report", &e),
                }
            }
        }
        Ok(summary) => {
            logging::log_progress(
                ProcessId::current(),
                "Interrupted",
                &format!("{} generations completed", summary.generations_completed),
            );
        }
        Err(e) => logging::log_error(ProcessId::current(), "Simulation", e),
    }

    shutdown.cancel();
    if let Some(task) = endpoint_task {
        if let Err(e) = task.await? {
            logging::log_error(ProcessId::current(), "Status endpoint", &e);
        }
    }

    summary?;
    Ok(())
}
