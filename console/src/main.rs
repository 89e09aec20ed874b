//! simtalk: operator console for running simulators
//!
//! Scans the discovery port range for simulator status endpoints and opens a
//! prompt for querying and stopping them.

use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;

use console::{Console, HttpInstanceClient, TcpInstanceScanner};
use shared::{DEFAULT_INSTANCE_HOST, PortRange, ProcessId, logging};

/// Interactive console for simulator instances
#[derive(Parser, Debug)]
#[command(name = "simtalk")]
#[command(about = "Talk to running simulators")]
struct Args {
    /// Port of the simulator to select first
    start_port: Option<u16>,

    /// First port scanned for simulators
    #[arg(long, default_value_t = PortRange::discovery().base)]
    base_port: u16,

    /// Last port scanned for simulators
    #[arg(long, default_value_t = PortRange::discovery().max)]
    max_port: u16,

    /// Host the simulators run on
    #[arg(long, env = "SIMTALK_HOST", default_value = DEFAULT_INSTANCE_HOST)]
    host: String,

    /// Command history file (defaults to ~/.simtalk_history)
    #[arg(long, env = "SIMTALK_HISTORY")]
    history_file: Option<PathBuf>,

    /// Seconds to wait for a simulator to answer
    #[arg(long, default_value = "10")]
    timeout_secs: u64,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "SIMTALK_LOG_LEVEL", default_value = "warn")]
    log_level: String,
}

fn default_history_file() -> PathBuf {
    std::env::var_os("HOME")
        .map(PathBuf::from)
        .unwrap_or_default()
        .join(".simtalk_history")
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    let args = Args::parse();

    ProcessId::init_console();
    logging::init_tracing_with_level(Some(&args.log_level));

    let range = PortRange::new(args.base_port, args.max_port)?;
    let history_file = args.history_file.unwrap_or_else(default_history_file);

    let scanner = TcpInstanceScanner::new(args.host.clone());
    let client = HttpInstanceClient::new(Duration::from_secs(args.timeout_secs))?;
    let mut console = Console::new(scanner, client, range, args.host);

    print!("{}", console.start(args.start_port).await);
    console
        .run(&history_file)
        .await
        .context("simtalk stopped unexpectedly")?;

    Ok(())
}
