//! Instance discovery by TCP connect probes
//!
//! A port counts as live when a TCP connection to it succeeds within the probe
//! timeout. The connection is closed immediately; nothing is sent, so any
//! listener on the port is reported.

use async_trait::async_trait;
use futures_util::future::join_all;
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::time::timeout;

use shared::PortRange;
use crate::traits::InstanceScanner;

pub const PROBE_TIMEOUT: Duration = Duration::from_secs(1);

#[derive(Debug, Clone)]
pub struct TcpInstanceScanner {
    host: String,
    probe_timeout: Duration,
}

impl TcpInstanceScanner {
    pub fn new(host: impl Into<String>) -> Self {
        Self::with_timeout(host, PROBE_TIMEOUT)
    }

    pub fn with_timeout(host: impl Into<String>, probe_timeout: Duration) -> Self {
        Self {
            host: host.into(),
            probe_timeout,
        }
    }

    async fn probe(&self, port: u16) -> bool {
        matches!(
            timeout(self.probe_timeout, TcpStream::connect((self.host.as_str(), port))).await,
            Ok(Ok(_))
        )
    }
}

#[async_trait]
impl InstanceScanner for TcpInstanceScanner {
    async fn scan(&self, range: PortRange) -> Vec<u16> {
        let probes = range
            .ports()
            .map(|port| async move { self.probe(port).await.then_some(port) });

        // probes finish in any order
        let mut live: Vec<u16> = join_all(probes).await.into_iter().flatten().collect();
        live.sort_unstable();
        live
    }
}
