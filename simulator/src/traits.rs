//! Service trait definitions for dependency injection
//!
//! The engine and the dispatcher transport are the two seams where the control
//! plane meets something it does not own; both are mockable for tests.

use async_trait::async_trait;

use crate::error::SimulatorResult;
use crate::types::TransportResponse;

/// The evolutionary engine, seen from the control plane
///
/// The runner calls this once per generation and re-reads the loop and
/// generation targets between calls, which is where a cooperative stop
/// takes effect.
#[mockall::automock]
#[async_trait]
pub trait SimulationEngine: Send + Sync {
    /// Run one full generation
    async fn run_generation(&mut self, loop_index: u32, generation: u32) -> SimulatorResult<()>;
}

/// Single-attempt HTTP POST to the dispatcher
#[mockall::automock]
#[async_trait]
pub trait DispatchTransport: Send + Sync {
    /// POST a JSON body and return status plus raw body
    async fn post(&self, url: &str, body: Vec<u8>) -> SimulatorResult<TransportResponse>;
}
