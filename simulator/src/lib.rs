//! Simulator control plane library
//!
//! Everything a simulation process needs to be observable and steerable:
//! a status endpoint on the first free port of the status range, the
//! completion-time estimator, and the dispatcher reporter. The evolutionary
//! engine itself plugs in through [`SimulationEngine`].

pub mod error;
pub mod types;
pub mod traits;
pub mod state;
pub mod core;
pub mod services;

// Re-export main types
pub use error::{SimulatorError, SimulatorResult};
pub use state::SimulationState;
pub use types::*;
pub use traits::*;
pub use crate::core::{EstimateOutcome, PacedEngine, ProgressEstimate, RunSummary, SimulationRunner, estimate};

// Re-export service implementations
pub use services::{DispatcherReporter, HttpDispatchTransport, PortAllocator, StatusEndpoint};
