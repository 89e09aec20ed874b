//! Common test utilities for simulator integration tests

#![allow(dead_code)]

use chrono::NaiveDate;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use simulator::{HostProfile, SimulationProfile, SimulationState, SimulatorResult, StatusEndpoint};

pub fn test_state(sid: i64, loops: u32, generations: u32) -> Arc<SimulationState> {
    let profile = SimulationProfile::new(
        "runs/baseline.json5",
        NaiveDate::from_ymd_opt(2019, 6, 1).unwrap(),
        NaiveDate::from_ymd_opt(2020, 6, 1).unwrap(),
        100,
        loops,
        generations,
    )
    .expect("Valid test profile");
    let host = HostProfile {
        machine_id: "integration-machine".to_string(),
        host_name: "localhost".to_string(),
        cpus: 4,
        memory: "16GB".to_string(),
        cpu_architecture: "aarch64".to_string(),
    };
    Arc::new(SimulationState::new(sid, profile, host, "/srv/sim".to_string()))
}

/// A status endpoint serving on an ephemeral loopback port
pub struct RunningEndpoint {
    pub endpoint: Arc<StatusEndpoint>,
    pub base_url: String,
    pub shutdown: CancellationToken,
    pub task: JoinHandle<SimulatorResult<()>>,
}

impl RunningEndpoint {
    pub async fn start(state: Arc<SimulationState>) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        let endpoint = Arc::new(StatusEndpoint::with_grace_period(state, Duration::from_millis(500)));
        let shutdown = CancellationToken::new();

        let task = {
            let endpoint = endpoint.clone();
            let shutdown = shutdown.clone();
            tokio::spawn(async move { endpoint.serve(listener, shutdown).await })
        };

        Self {
            endpoint,
            base_url: format!("http://127.0.0.1:{port}"),
            shutdown,
            task,
        }
    }
}
