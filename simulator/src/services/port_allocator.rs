//! First-free-port allocation for the status endpoint

use std::net::{IpAddr, SocketAddr};
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;

use shared::{PortRange, ProcessId, process_debug, process_info};
use crate::error::{SimulatorError, SimulatorResult};

/// Scans a port range in ascending order and keeps the first listener it can bind
#[derive(Debug, Clone)]
pub struct PortAllocator {
    host: IpAddr,
    range: PortRange,
}

impl PortAllocator {
    pub fn new(host: IpAddr, range: PortRange) -> Self {
        Self { host, range }
    }

    pub fn range(&self) -> PortRange {
        self.range
    }

    /// Bind the lowest free port of the range
    ///
    /// The returned listener is already bound, so the port cannot be taken by
    /// another instance between probing and serving.
    pub async fn acquire(&self, cancel: &CancellationToken) -> SimulatorResult<(TcpListener, u16)> {
        for port in self.range.ports() {
            if cancel.is_cancelled() {
                return Err(SimulatorError::NoPortAvailable { range: self.range, cancelled: true });
            }

            match TcpListener::bind(SocketAddr::new(self.host, port)).await {
                Ok(listener) => {
                    process_info!(ProcessId::current(), "🔌 Bound status port {} on {}", port, self.host);
                    return Ok((listener, port));
                }
                Err(e) => {
                    process_debug!(ProcessId::current(), "Port {} unavailable: {}", port, e);
                }
            }
        }

        Err(SimulatorError::NoPortAvailable { range: self.range, cancelled: false })
    }
}
