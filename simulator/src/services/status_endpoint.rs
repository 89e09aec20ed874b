//! HTTP status endpoint
//!
//! Serves `/status` and `/stop` for one simulation while it runs. The phase
//! moves `Starting -> Serving -> ShuttingDown -> Stopped` and is published on a
//! watch channel. Each accepted connection runs in a task owned by the
//! endpoint; shutdown drains them for at most the grace period and then
//! aborts whatever is left, closing those sockets.

use axum::{
    extract::State,
    http::{HeaderMap, header},
    response::{IntoResponse, Json, Response},
    routing::get,
    Router,
};
use chrono::{DateTime, SecondsFormat, Utc};
use hyper::body::Incoming;
use hyper::server::conn::http1;
use hyper_util::rt::TokioIo;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::watch;
use tokio::task::JoinSet;
use tower::{ServiceBuilder, ServiceExt};
use tower_http::trace::TraceLayer;
use tokio_util::sync::CancellationToken;

use shared::{ProcessId, ShortResponse, StatusSnapshot, format_duration, process_debug, process_info, process_warn};
use crate::core::{EstimateOutcome, estimate};
use crate::error::SimulatorResult;
use crate::state::SimulationState;
use crate::types::EndpointPhase;

/// Upper bound on draining open connections at shutdown
pub const SHUTDOWN_GRACE: Duration = Duration::from_secs(5);

pub const STOP_MESSAGE: &str = "Stopping after current generation";

const UNKNOWN: &str = "unknown";

#[derive(Clone)]
struct EndpointContext {
    state: Arc<SimulationState>,
}

pub struct StatusEndpoint {
    state: Arc<SimulationState>,
    phase: watch::Sender<EndpointPhase>,
    grace: Duration,
}

impl StatusEndpoint {
    pub fn new(state: Arc<SimulationState>) -> Self {
        Self::with_grace_period(state, SHUTDOWN_GRACE)
    }

    pub fn with_grace_period(state: Arc<SimulationState>, grace: Duration) -> Self {
        let (phase, _) = watch::channel(EndpointPhase::Starting);
        Self { state, phase, grace }
    }

    pub fn phase(&self) -> EndpointPhase {
        *self.phase.borrow()
    }

    /// Follow phase changes
    pub fn subscribe(&self) -> watch::Receiver<EndpointPhase> {
        self.phase.subscribe()
    }

    pub fn router(&self) -> Router {
        let context = EndpointContext { state: self.state.clone() };

        Router::new()
            .route("/status", get(status_handler))
            .route("/stop", get(stop_handler).post(stop_handler))
            .layer(
                ServiceBuilder::new()
                    .layer(TraceLayer::new_for_http())
                    .into_inner(),
            )
            .with_state(context)
    }

    /// Serve on an already bound listener until `shutdown` is cancelled
    pub async fn serve(&self, listener: TcpListener, shutdown: CancellationToken) -> SimulatorResult<()> {
        let address = listener.local_addr()?;
        let router = self.router();
        let mut connections = JoinSet::new();

        self.phase.send_replace(EndpointPhase::Serving);
        process_info!(ProcessId::current(), "📡 Status endpoint serving on http://{}", address);

        loop {
            tokio::select! {
                accepted = listener.accept() => match accepted {
                    Ok((stream, peer)) => {
                        connections.spawn(serve_connection(stream, peer, router.clone(), shutdown.clone()));
                    }
                    Err(e) => process_warn!(ProcessId::current(), "⚠️ Status endpoint accept failed: {}", e),
                },
                Some(_) = connections.join_next(), if !connections.is_empty() => {}
                _ = shutdown.cancelled() => break,
            }
        }

        // Release the port before draining
        drop(listener);
        self.phase.send_replace(EndpointPhase::ShuttingDown);

        let drain = async {
            while connections.join_next().await.is_some() {}
        };
        if tokio::time::timeout(self.grace, drain).await.is_err() {
            process_warn!(
                ProcessId::current(),
                "⏱️ Status endpoint did not drain within {:?}, closing {} connection(s)",
                self.grace,
                connections.len()
            );
            connections.shutdown().await;
        }

        self.phase.send_replace(EndpointPhase::Stopped);
        process_info!(ProcessId::current(), "📡 Status endpoint stopped");
        Ok(())
    }
}

/// Drive one HTTP/1 connection; stop keep-alive once shutdown starts
async fn serve_connection(stream: TcpStream, peer: SocketAddr, router: Router, shutdown: CancellationToken) {
    let service = hyper::service::service_fn(move |request: hyper::Request<Incoming>| router.clone().oneshot(request));
    let connection = http1::Builder::new().serve_connection(TokioIo::new(stream), service);
    tokio::pin!(connection);

    let mut draining = false;
    let result = loop {
        tokio::select! {
            result = connection.as_mut() => break result,
            _ = shutdown.cancelled(), if !draining => {
                draining = true;
                connection.as_mut().graceful_shutdown();
            }
        }
    };

    if let Err(e) = result {
        process_debug!(ProcessId::current(), "Connection from {} ended: {}", peer, e);
    }
}

fn wants_json(headers: &HeaderMap) -> bool {
    headers
        .get(header::ACCEPT)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|accept| accept.contains("application/json"))
}

async fn status_handler(State(context): State<EndpointContext>, headers: HeaderMap) -> Response {
    let snapshot = build_snapshot(&context.state, Utc::now()).await;
    if wants_json(&headers) {
        Json(snapshot).into_response()
    } else {
        snapshot.to_string().into_response()
    }
}

async fn stop_handler(State(context): State<EndpointContext>) -> Json<ShortResponse> {
    context.state.request_stop().await;
    process_info!(ProcessId::current(), "🛑 Stop requested, finishing current generation");
    Json(ShortResponse::success(STOP_MESSAGE).with_id(context.state.sid))
}

fn rfc3339(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Recompute the status snapshot as of `now`
pub async fn build_snapshot(state: &SimulationState, now: DateTime<Utc>) -> StatusSnapshot {
    let counters = state.counters().await;
    let finished_at = state.finished_at().await;

    let run_duration = (finished_at.unwrap_or(now) - state.program_started)
        .to_std()
        .unwrap_or_default();

    let elapsed_time_last_gen = match (counters.last_generation_start, counters.last_generation_stop) {
        (Some(start), Some(stop)) => (stop - start)
            .to_std()
            .map(format_duration)
            .unwrap_or_else(|_| UNKNOWN.to_string()),
        _ => UNKNOWN.to_string(),
    };

    let (estimated_time_remaining, estimated_completion) = match finished_at {
        Some(finished) => (format_duration(Duration::ZERO), rfc3339(finished)),
        None => match estimate(&counters, now) {
            EstimateOutcome::Estimate(progress) => (
                format_duration(progress.remaining_duration),
                rfc3339(progress.estimated_completion),
            ),
            EstimateOutcome::NothingToReport | EstimateOutcome::InsufficientData => {
                (UNKNOWN.to_string(), UNKNOWN.to_string())
            }
        },
    };

    StatusSnapshot {
        program_started: rfc3339(state.program_started),
        run_duration: format_duration(run_duration),
        config_file: state.profile.config_file.clone(),
        simulation_date_range: state.profile.date_range_label(),
        population_size: state.profile.population_size,
        loop_count: counters.loops_requested,
        generations_requested: counters.generations_per_loop,
        completed_loops: counters.loops_completed,
        completed_generations: counters.generations_completed,
        elapsed_time_last_gen,
        estimated_time_remaining,
        estimated_completion,
        sid: state.sid,
        url: state.status_url().await.unwrap_or_default(),
        machine_id: state.host.machine_id.clone(),
        working_directory: state.working_directory.clone(),
    }
}
