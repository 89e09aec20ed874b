//! Type definitions for the simulator
//!
//! Data types shared by the runner, the status endpoint and the dispatcher
//! reporter that are not service traits.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::net::{IpAddr, Ipv4Addr};
use std::time::Duration;

use shared::PortRange;

use crate::error::{SimulatorError, SimulatorResult};

/// Fixed description of a run, as configured for the engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationProfile {
    pub config_file: String,
    pub date_start: NaiveDate,
    pub date_stop: NaiveDate,
    pub population_size: u32,
    pub loop_count: u32,
    pub generations: u32,
}

impl SimulationProfile {
    pub fn new(
        config_file: impl Into<String>,
        date_start: NaiveDate,
        date_stop: NaiveDate,
        population_size: u32,
        loop_count: u32,
        generations: u32,
    ) -> SimulatorResult<Self> {
        if date_start > date_stop {
            return Err(SimulatorError::config(format!(
                "start date {date_start} is after stop date {date_stop}"
            )));
        }
        if loop_count == 0 || generations == 0 {
            return Err(SimulatorError::config("loop count and generations must be at least 1"));
        }

        Ok(Self {
            config_file: config_file.into(),
            date_start,
            date_stop,
            population_size,
            loop_count,
            generations,
        })
    }

    /// "Jan 2, 2006 - Feb 3, 2007"
    pub fn date_range_label(&self) -> String {
        format!(
            "{} - {}",
            self.date_start.format("%b %-d, %Y"),
            self.date_stop.format("%b %-d, %Y")
        )
    }
}

/// Default spacing of progress reports to the dispatcher
pub const DEFAULT_REPORT_INTERVAL: Duration = Duration::from_secs(5 * 60);

/// How the control plane around one simulation is wired
#[derive(Debug, Clone, PartialEq)]
pub struct ControlPlaneConfig {
    /// Ports tried, in order, for the status endpoint
    pub status_range: PortRange,
    pub bind_host: IpAddr,
    /// Serve the status endpoint at all
    pub talk: bool,
    /// Dispatcher base URL
    pub dispatcher: Option<String>,
    pub report_interval: Duration,
}

impl Default for ControlPlaneConfig {
    fn default() -> Self {
        Self {
            status_range: PortRange::status(),
            bind_host: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            talk: true,
            dispatcher: None,
            report_interval: DEFAULT_REPORT_INTERVAL,
        }
    }
}

impl ControlPlaneConfig {
    /// Dispatcher to report to; reporting needs a dispatcher-assigned ID
    pub fn reporting_target(&self, sid: i64) -> Option<&str> {
        self.dispatcher.as_deref().filter(|_| sid > 0)
    }
}

/// Live progress counters, written by the runner and read by everyone else
///
/// `loops_requested` and `generations_per_loop` are the targets the runner
/// re-reads at every generation boundary; `/stop` lowers them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProgressCounters {
    pub loops_requested: u32,
    pub generations_per_loop: u32,
    pub loops_completed: u32,
    /// Generations completed across all loops
    pub generations_completed: u64,
    pub last_generation_start: Option<DateTime<Utc>>,
    pub last_generation_stop: Option<DateTime<Utc>>,
}

impl ProgressCounters {
    pub fn new(loops_requested: u32, generations_per_loop: u32) -> Self {
        Self {
            loops_requested,
            generations_per_loop,
            ..Default::default()
        }
    }

    pub fn total_generations(&self) -> u64 {
        u64::from(self.loops_requested) * u64::from(self.generations_per_loop)
    }
}

/// Facts about the machine a simulation runs on
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HostProfile {
    pub machine_id: String,
    pub host_name: String,
    pub cpus: usize,
    pub memory: String,
    pub cpu_architecture: String,
}

/// Lifecycle of the status endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EndpointPhase {
    Starting,
    Serving,
    ShuttingDown,
    Stopped,
}

/// Raw answer from the dispatcher
#[derive(Debug, Clone, PartialEq)]
pub struct TransportResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

/// Why a report was not sent
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// No generation has completed yet
    NothingToReport,
    /// Last generation timing is unusable (zero or negative)
    InsufficientData,
}

/// Result of one reporting attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportOutcome {
    Sent { acknowledged: bool },
    Skipped(SkipReason),
}
