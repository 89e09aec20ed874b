//! Stand-in engine for running the control plane on its own

use async_trait::async_trait;
use std::time::Duration;

use crate::error::SimulatorResult;
use crate::traits::SimulationEngine;

/// Spends a fixed wall-clock time on every generation
#[derive(Debug, Clone)]
pub struct PacedEngine {
    generation_time: Duration,
}

impl PacedEngine {
    pub fn new(generation_time: Duration) -> Self {
        Self { generation_time }
    }
}

#[async_trait]
impl SimulationEngine for PacedEngine {
    async fn run_generation(&mut self, _loop_index: u32, _generation: u32) -> SimulatorResult<()> {
        if !self.generation_time.is_zero() {
            tokio::time::sleep(self.generation_time).await;
        }
        Ok(())
    }
}
