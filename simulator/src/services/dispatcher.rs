//! Progress reporting to the dispatcher
//!
//! Each report is a single POST of an `UpdateItem` command to
//! `{dispatcher}command`. Failed reports are not retried here; the periodic
//! loop simply tries again on its next tick.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{Instant, interval_at};
use tokio_util::sync::CancellationToken;
use url::Url;

use shared::messages::SIMULATOR_USERNAME;
use shared::{
    DispatchCommand, DispatcherUpdate, ProcessId, ShortResponse, UpdateTimestamp, logging, process_debug,
    process_info, process_warn,
};
use crate::core::{EstimateOutcome, estimate};
use crate::error::{SimulatorError, SimulatorResult};
use crate::state::SimulationState;
use crate::traits::DispatchTransport;
use crate::types::{ReportOutcome, SkipReason, TransportResponse};

/// Availability while a run is in progress
pub const AVAILABILITY_BUSY: &str = "busy";
/// Availability once the run has completed
pub const AVAILABILITY_AVAILABLE: &str = "available";

/// reqwest-backed transport
#[derive(Clone)]
pub struct HttpDispatchTransport {
    client: reqwest::Client,
}

impl HttpDispatchTransport {
    pub fn new(timeout: Duration) -> SimulatorResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| SimulatorError::transport(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl DispatchTransport for HttpDispatchTransport {
    async fn post(&self, url: &str, body: Vec<u8>) -> SimulatorResult<TransportResponse> {
        let response = self
            .client
            .post(url)
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .await
            .map_err(|e| SimulatorError::transport(format!("POST {} failed: {}", url, e)))?;

        let status = response.status().as_u16();
        let body = response
            .bytes()
            .await
            .map_err(|e| SimulatorError::transport(format!("Reading response from {} failed: {}", url, e)))?;

        Ok(TransportResponse { status, body: body.to_vec() })
    }
}

/// Builds and sends `UpdateItem` reports for one simulation
pub struct DispatcherReporter<T: DispatchTransport> {
    transport: T,
    command_url: Url,
    state: Arc<SimulationState>,
}

impl<T: DispatchTransport> DispatcherReporter<T> {
    /// `dispatcher` is the dispatcher's base URL; `command` is resolved against it
    pub fn new(transport: T, dispatcher: &str, state: Arc<SimulationState>) -> SimulatorResult<Self> {
        let mut base = Url::parse(dispatcher)?;
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        let command_url = base.join("command")?;

        Ok(Self { transport, command_url, state })
    }

    pub fn command_url(&self) -> &Url {
        &self.command_url
    }

    /// Send a progress estimate, or the completion record when `completed` is set
    ///
    /// Progress reports are skipped without touching the network until the
    /// estimator has something to say.
    pub async fn report(&self, completed: Option<DateTime<Utc>>) -> SimulatorResult<ReportOutcome> {
        let (timestamp, availability) = match completed {
            Some(at) => (UpdateTimestamp::completed(at), AVAILABILITY_AVAILABLE),
            None => {
                let counters = self.state.counters().await;
                match estimate(&counters, Utc::now()) {
                    EstimateOutcome::Estimate(progress) => {
                        (UpdateTimestamp::estimated(progress.estimated_completion), AVAILABILITY_BUSY)
                    }
                    EstimateOutcome::NothingToReport => {
                        process_debug!(ProcessId::current(), "No generation completed yet, skipping report");
                        return Ok(ReportOutcome::Skipped(SkipReason::NothingToReport));
                    }
                    EstimateOutcome::InsufficientData => {
                        process_debug!(ProcessId::current(), "Last generation timing unusable, skipping report");
                        return Ok(ReportOutcome::Skipped(SkipReason::InsufficientData));
                    }
                }
            }
        };

        let update = self.build_update(timestamp, availability);
        let body = DispatchCommand::update_item(SIMULATOR_USERNAME, update).to_bytes()?;

        let response = self.transport.post(self.command_url.as_str(), body).await?;
        if response.status != 200 {
            return Err(SimulatorError::protocol(format!(
                "dispatcher answered HTTP {}",
                response.status
            )));
        }

        let ack: ShortResponse = serde_json::from_slice(&response.body)
            .map_err(|e| SimulatorError::protocol(format!("undecodable dispatcher response: {}", e)))?;

        if !ack.is_success() {
            process_warn!(
                ProcessId::current(),
                "⚠️ Dispatcher did not accept update: {} {}",
                ack.status,
                ack.message
            );
            return Ok(ReportOutcome::Sent { acknowledged: false });
        }

        Ok(ReportOutcome::Sent { acknowledged: true })
    }

    fn build_update(&self, timestamp: UpdateTimestamp, availability: &str) -> DispatcherUpdate {
        let host = &self.state.host;
        DispatcherUpdate {
            sid: self.state.sid,
            machine_id: host.machine_id.clone(),
            cpus: host.cpus,
            memory: host.memory.clone(),
            cpu_architecture: host.cpu_architecture.clone(),
            availability: availability.to_string(),
            timestamp,
        }
    }

    /// Report every `every` until `stop` is cancelled
    pub async fn run_periodic(&self, every: Duration, stop: CancellationToken) {
        let mut ticker = interval_at(Instant::now() + every, every);
        process_info!(
            ProcessId::current(),
            "📤 Reporting to {} every {}",
            self.command_url,
            shared::format_duration(every)
        );

        loop {
            tokio::select! {
                _ = stop.cancelled() => break,
                _ = ticker.tick() => {
                    match self.report(None).await {
                        Ok(ReportOutcome::Sent { acknowledged: true }) => {
                            process_debug!(ProcessId::current(), "Progress report acknowledged");
                        }
                        Ok(_) => {}
                        Err(e) => logging::log_error(ProcessId::current(), "Progress report", &e),
                    }
                }
            }
        }
    }
}
