//! Core business logic
//!
//! Pure progress estimation and the generation/loop driver. No network I/O.

pub mod estimator;
pub mod runner;
pub mod engine;

pub use estimator::{EstimateOutcome, ProgressEstimate, estimate};
pub use runner::{RunSummary, SimulationRunner};
pub use engine::PacedEngine;
