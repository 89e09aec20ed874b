//! Shared types for the simulation control plane
//!
//! Contains only what both sides of the wire need: the simulator's status
//! endpoint and dispatcher reporter, and the operator console that talks to
//! them. Component-internal types stay in their respective crates.

pub mod types;
pub mod errors;
pub mod logging;
pub mod messages;

pub use types::*;
pub use errors::*;

// Re-export the wire protocol
pub use messages::{
    // Instance ↔ Console communication
    StatusSnapshot, ShortResponse,

    // Instance → Dispatcher communication
    DispatchCommand, DispatchEnvelope, DispatchPayload, DispatcherUpdate, UpdateTimestamp,
};
