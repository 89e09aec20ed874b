//! Service-specific tests
//!
//! Each service has its own test file; shared fixtures live in `common`.


// Common test utilities for services
#[cfg(test)]
pub mod common {
    use chrono::NaiveDate;
    use std::net::TcpListener;
    use std::sync::Arc;

    use crate::state::SimulationState;
    use crate::types::{HostProfile, ProgressCounters, SimulationProfile};

    pub fn test_host() -> HostProfile {
        HostProfile {
            machine_id: "7f3a9c2e1b".to_string(),
            host_name: "sim-host".to_string(),
            cpus: 8,
            memory: "32GB".to_string(),
            cpu_architecture: "x86_64".to_string(),
        }
    }

    pub fn test_profile(loops: u32, generations: u32) -> SimulationProfile {
        SimulationProfile::new(
            "config/sim.json5",
            NaiveDate::from_ymd_opt(2020, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2021, 12, 31).unwrap(),
            200,
            loops,
            generations,
        )
        .expect("Valid test profile")
    }

    /// Fresh state for simulation `sid` with the given targets
    pub fn test_state(sid: i64, loops: u32, generations: u32) -> Arc<SimulationState> {
        Arc::new(SimulationState::new(sid, test_profile(loops, generations), test_host(), "/work".to_string()))
    }

    /// State with explicit counters, for estimate-dependent tests
    pub fn test_state_with(sid: i64, counters: ProgressCounters) -> Arc<SimulationState> {
        let profile = test_profile(counters.loops_requested.max(1), counters.generations_per_loop.max(1));
        Arc::new(SimulationState::from_counters(sid, profile, test_host(), "/work".to_string(), counters))
    }

    /// Hold `count` consecutive loopback ports, returning the first one
    pub fn hold_consecutive_ports(count: u16) -> (u16, Vec<TcpListener>) {
        for _ in 0..50 {
            let first = TcpListener::bind("127.0.0.1:0").unwrap();
            let base = first.local_addr().unwrap().port();
            if base.checked_add(count).is_none() {
                continue;
            }

            let mut held = vec![first];
            for port in base + 1..base + count {
                match TcpListener::bind(("127.0.0.1", port)) {
                    Ok(listener) => held.push(listener),
                    Err(_) => break,
                }
            }
            if held.len() == usize::from(count) {
                return (base, held);
            }
        }
        panic!("could not hold {count} consecutive ports");
    }
}
