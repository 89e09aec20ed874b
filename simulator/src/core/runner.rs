//! Generation/loop driver
//!
//! Walks the engine through `loops × generations`, re-reading both targets
//! from [`SimulationState`] at every generation boundary. A `/stop` request
//! lowers the targets, so the generation in progress is the last one run.

use chrono::{DateTime, Utc};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

use shared::{ProcessId, process_debug, process_info};
use crate::error::SimulatorResult;
use crate::state::SimulationState;
use crate::traits::SimulationEngine;

/// How a run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    pub finished_at: DateTime<Utc>,
    pub generations_completed: u64,
    /// True when the shutdown token ended the run early
    pub interrupted: bool,
}

pub struct SimulationRunner<E: SimulationEngine> {
    state: Arc<SimulationState>,
    engine: E,
    shutdown: CancellationToken,
}

impl<E: SimulationEngine> SimulationRunner<E> {
    pub fn new(state: Arc<SimulationState>, engine: E, shutdown: CancellationToken) -> Self {
        Self { state, engine, shutdown }
    }

    /// Run until the targets are met or shutdown is requested
    pub async fn run(&mut self) -> SimulatorResult<RunSummary> {
        let mut loop_index = 0;
        let mut interrupted = false;

        'loops: loop {
            let (loops_requested, _) = self.state.targets().await;
            if loop_index >= loops_requested {
                break;
            }

            let mut generation = 0;
            loop {
                let (_, generations_per_loop) = self.state.targets().await;
                if generation >= generations_per_loop {
                    break;
                }
                if self.shutdown.is_cancelled() {
                    interrupted = true;
                    break 'loops;
                }

                let started = Utc::now();
                self.engine.run_generation(loop_index, generation).await?;
                let completed = self.state.record_generation(started, Utc::now()).await;

                process_debug!(
                    ProcessId::current(),
                    "Generation {} of loop {} done ({} total)",
                    generation + 1,
                    loop_index + 1,
                    completed
                );
                generation += 1;
            }

            let loops_completed = self.state.record_loop().await;
            process_info!(ProcessId::current(), "🔁 Loop {} complete", loops_completed);
            loop_index += 1;
        }

        let finished_at = Utc::now();
        self.state.mark_finished(finished_at).await;

        Ok(RunSummary {
            finished_at,
            generations_completed: self.state.counters().await.generations_completed,
            interrupted,
        })
    }
}
