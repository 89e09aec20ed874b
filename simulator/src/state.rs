//! Simulator state management
//!
//! One `SimulationState` per process, shared behind an `Arc` by the runner
//! (the only writer of progress), the status endpoint and the reporter.

use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use crate::types::{HostProfile, ProgressCounters, SimulationProfile};

/// Core simulator state
#[derive(Debug)]
pub struct SimulationState {
    /// Simulation ID assigned by the dispatcher, 0 when standalone
    pub sid: i64,
    pub profile: SimulationProfile,
    pub host: HostProfile,
    pub working_directory: String,
    pub program_started: DateTime<Utc>,

    // Loop/generation targets and progress live under one lock so a reader
    // never sees a target pair that is half updated by a stop request.
    counters: RwLock<ProgressCounters>,
    finished_at: RwLock<Option<DateTime<Utc>>>,
    status_url: RwLock<Option<String>>,
}

impl SimulationState {
    /// Create state for a fresh run
    pub fn new(sid: i64, profile: SimulationProfile, host: HostProfile, working_directory: String) -> Self {
        let counters = ProgressCounters::new(profile.loop_count, profile.generations);
        Self::from_counters(sid, profile, host, working_directory, counters)
    }

    /// Create state with explicit counters
    pub fn from_counters(
        sid: i64,
        profile: SimulationProfile,
        host: HostProfile,
        working_directory: String,
        counters: ProgressCounters,
    ) -> Self {
        Self {
            sid,
            profile,
            host,
            working_directory,
            program_started: Utc::now(),
            counters: RwLock::new(counters),
            finished_at: RwLock::new(None),
            status_url: RwLock::new(None),
        }
    }

    /// Consistent copy of the counters
    pub async fn counters(&self) -> ProgressCounters {
        self.counters.read().await.clone()
    }

    /// Current (loops, generations per loop) targets
    pub async fn targets(&self) -> (u32, u32) {
        let counters = self.counters.read().await;
        (counters.loops_requested, counters.generations_per_loop)
    }

    /// Record a finished generation and its timing
    pub async fn record_generation(&self, started: DateTime<Utc>, stopped: DateTime<Utc>) -> u64 {
        let mut counters = self.counters.write().await;
        counters.generations_completed += 1;
        counters.last_generation_start = Some(started);
        counters.last_generation_stop = Some(stopped);
        counters.generations_completed
    }

    /// Record a finished loop
    pub async fn record_loop(&self) -> u32 {
        let mut counters = self.counters.write().await;
        counters.loops_completed += 1;
        counters.loops_completed
    }

    /// Cooperative stop: only the generation in progress completes
    ///
    /// Both targets drop to their minimum in a single write.
    pub async fn request_stop(&self) {
        let mut counters = self.counters.write().await;
        counters.loops_requested = 1;
        counters.generations_per_loop = 1;
    }

    pub async fn mark_finished(&self, at: DateTime<Utc>) {
        *self.finished_at.write().await = Some(at);
    }

    pub async fn finished_at(&self) -> Option<DateTime<Utc>> {
        *self.finished_at.read().await
    }

    /// Remember where the status endpoint can be reached
    pub async fn set_status_url(&self, url: String) {
        *self.status_url.write().await = Some(url);
    }

    pub async fn status_url(&self) -> Option<String> {
        self.status_url.read().await.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveDate};
    use std::sync::Arc;

    fn state() -> SimulationState {
        let day = NaiveDate::from_ymd_opt(2020, 1, 1).unwrap();
        let profile = SimulationProfile::new("config.json5", day, day, 50, 3, 40).unwrap();
        let host = HostProfile {
            machine_id: "test-machine".to_string(),
            host_name: "test-host".to_string(),
            cpus: 4,
            memory: "16 GB".to_string(),
            cpu_architecture: "x86_64".to_string(),
        };
        SimulationState::new(5, profile, host, "/tmp".to_string())
    }

    #[tokio::test]
    async fn test_new_state_takes_targets_from_profile() {
        let state = state();
        assert_eq!(state.targets().await, (3, 40));
        assert_eq!(state.counters().await.generations_completed, 0);
        assert!(state.finished_at().await.is_none());
    }

    #[tokio::test]
    async fn test_record_generation_keeps_timing_pair() {
        let state = state();
        let start = Utc::now();
        let stop = start + Duration::seconds(3);

        assert_eq!(state.record_generation(start, stop).await, 1);
        assert_eq!(state.record_generation(start, stop).await, 2);

        let counters = state.counters().await;
        assert_eq!(counters.last_generation_start, Some(start));
        assert_eq!(counters.last_generation_stop, Some(stop));
    }

    #[tokio::test]
    async fn test_stop_request_is_never_observed_half_applied() {
        let state = Arc::new(state());

        let reader = {
            let state = state.clone();
            tokio::spawn(async move {
                for _ in 0..1_000 {
                    let (loops, generations) = state.targets().await;
                    assert!(
                        (loops, generations) == (3, 40) || (loops, generations) == (1, 1),
                        "torn read: {loops} loops, {generations} generations"
                    );
                    tokio::task::yield_now().await;
                }
            })
        };

        state.request_stop().await;
        reader.await.unwrap();
        assert_eq!(state.targets().await, (1, 1));
    }

    #[tokio::test]
    async fn test_status_url_is_set_once_bound() {
        let state = state();
        assert!(state.status_url().await.is_none());

        state.set_status_url("http://host:8080".to_string()).await;
        assert_eq!(state.status_url().await.as_deref(), Some("http://host:8080"));
    }
}
