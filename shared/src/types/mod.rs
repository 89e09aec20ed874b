//! Core types used throughout the control plane

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::RangeInclusive;
use std::sync::OnceLock;
use std::time::Duration;

use crate::errors::{SharedError, SharedResult};

/// Lowest port a simulator may claim for its status endpoint
pub const STATUS_BASE_PORT: u16 = 8080;

/// Highest port a simulator may claim for its status endpoint
pub const STATUS_MAX_PORT: u16 = 8100;

/// Ports at the bottom of the status range that discovery skips
pub const DISCOVERY_SKIP_LOW: u16 = 10;

/// Host the console uses to reach instances
pub const DEFAULT_INSTANCE_HOST: &str = "localhost";

/// Global process ID singleton - set once at startup
static PROCESS_ID: OnceLock<ProcessId> = OnceLock::new();

static UNREGISTERED: ProcessId = ProcessId::Unregistered;

/// Process identifier for any component in the system
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProcessId {
    /// Simulation process, tagged with the dispatcher's simulation ID (0 when standalone)
    Simulator(i64),
    /// Operator console
    Console,
    /// Library code running before any init_* call (tests, embedding)
    Unregistered,
}

impl ProcessId {
    /// Initialize the global process ID for a simulator
    pub fn init_simulator(sid: i64) -> &'static ProcessId {
        PROCESS_ID.get_or_init(|| ProcessId::Simulator(sid))
    }

    /// Initialize the global process ID for the console
    pub fn init_console() -> &'static ProcessId {
        PROCESS_ID.get_or_init(|| ProcessId::Console)
    }

    /// Get the global process ID, or `Unregistered` if no init_* ran
    pub fn current() -> &'static ProcessId {
        PROCESS_ID.get().unwrap_or(&UNREGISTERED)
    }
}

impl fmt::Display for ProcessId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProcessId::Simulator(sid) => write!(f, "simulator_{sid}"),
            ProcessId::Console => write!(f, "console"),
            ProcessId::Unregistered => write!(f, "unregistered"),
        }
    }
}

/// Inclusive range of TCP ports
///
/// Allocation and discovery use different ranges on purpose: simulators claim
/// from [`PortRange::status`], while the console only looks for already-bound
/// instances in [`PortRange::discovery`], which leaves out the low
/// [`DISCOVERY_SKIP_LOW`] ports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PortRange {
    pub base: u16,
    pub max: u16,
}

impl PortRange {
    /// Create a range, rejecting `base > max`
    pub fn new(base: u16, max: u16) -> SharedResult<Self> {
        if base > max {
            return Err(SharedError::InvalidPortRange { base, max });
        }
        Ok(Self { base, max })
    }

    /// Range simulators allocate their status endpoint from
    pub const fn status() -> Self {
        Self {
            base: STATUS_BASE_PORT,
            max: STATUS_MAX_PORT,
        }
    }

    /// Range the console scans for live instances
    pub const fn discovery() -> Self {
        Self {
            base: STATUS_BASE_PORT + DISCOVERY_SKIP_LOW,
            max: STATUS_MAX_PORT,
        }
    }

    /// Range holding exactly one port
    pub const fn single(port: u16) -> Self {
        Self { base: port, max: port }
    }

    /// Ports in ascending order
    pub fn ports(&self) -> RangeInclusive<u16> {
        self.base..=self.max
    }

    pub fn contains(&self, port: u16) -> bool {
        self.ports().contains(&port)
    }

    pub fn len(&self) -> usize {
        usize::from(self.max - self.base) + 1
    }

    pub fn is_empty(&self) -> bool {
        false
    }
}

impl fmt::Display for PortRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.base, self.max)
    }
}

/// One live status server as seen by the console
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct InstanceEndpoint {
    pub host: String,
    pub port: u16,
}

impl InstanceEndpoint {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }

    pub fn localhost(port: u16) -> Self {
        Self::new(DEFAULT_INSTANCE_HOST, port)
    }

    /// Base URL commands are appended to, without a trailing slash
    pub fn base_url(&self) -> String {
        format!("http://{}:{}", self.host, self.port)
    }
}

/// Render a duration the way operators read it, e.g. "2 hours, 5 minutes, 0 seconds"
///
/// Leading zero units are dropped; everything below the largest non-zero unit
/// is always shown.
pub fn format_duration(d: Duration) -> String {
    let seconds = d.as_secs();
    let minutes = seconds / 60;
    let hours = minutes / 60;

    if seconds < 60 {
        format!("{seconds} seconds")
    } else if minutes < 60 {
        format!("{minutes} minutes, {} seconds", seconds % 60)
    } else if hours < 24 {
        format!("{hours} hours, {} minutes, {} seconds", minutes % 60, seconds % 60)
    } else {
        format!(
            "{} days, {} hours, {} minutes, {} seconds",
            hours / 24,
            hours % 24,
            minutes % 60,
            seconds % 60
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_discovery_range_skips_low_status_ports() {
        let status = PortRange::status();
        let discovery = PortRange::discovery();

        assert_eq!(status, PortRange { base: 8080, max: 8100 });
        assert_eq!(discovery, PortRange { base: 8090, max: 8100 });
        assert_eq!(discovery.base - status.base, DISCOVERY_SKIP_LOW);
        assert_eq!(discovery.max, status.max);
    }

    #[test]
    fn test_port_range_rejects_inverted_bounds() {
        assert!(PortRange::new(9000, 8999).is_err());

        let range = PortRange::new(9000, 9002).unwrap();
        assert_eq!(range.len(), 3);
        assert_eq!(range.ports().collect::<Vec<_>>(), vec![9000, 9001, 9002]);
        assert!(range.contains(9001));
        assert!(!range.contains(9003));
        assert_eq!(range.to_string(), "9000-9002");
    }

    #[test]
    fn test_instance_base_url() {
        assert_eq!(InstanceEndpoint::localhost(8091).base_url(), "http://localhost:8091");
    }

    #[test]
    fn test_format_duration_units() {
        assert_eq!(format_duration(Duration::from_secs(22)), "22 seconds");
        assert_eq!(format_duration(Duration::from_secs(125)), "2 minutes, 5 seconds");
        assert_eq!(format_duration(Duration::from_secs(7_500)), "2 hours, 5 minutes, 0 seconds");
        assert_eq!(
            format_duration(Duration::from_secs(90_061)),
            "1 days, 1 hours, 1 minutes, 1 seconds"
        );
    }

    #[test]
    fn test_process_id_defaults_to_unregistered() {
        // Tests never call init_*, so library logging still has an identity
        assert_eq!(ProcessId::current(), &ProcessId::Unregistered);
        assert_eq!(ProcessId::Simulator(42).to_string(), "simulator_42");
        assert_eq!(ProcessId::Console.to_string(), "console");
    }
}
