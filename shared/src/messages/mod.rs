//! Message types for the simulation control plane
//!
//! - `status`: Instance ↔ Console (status snapshot, stop confirmation)
//! - `dispatch`: Instance → Dispatcher (command envelope and update payloads)

pub mod status;
pub mod dispatch;

pub use status::{StatusSnapshot, ShortResponse, SUCCESS_STATUS};

pub use dispatch::{
    DispatchCommand, DispatchEnvelope, DispatchPayload, DispatcherUpdate, UpdateTimestamp,
    SIMULATOR_USERNAME, UPDATE_ITEM, format_rfc822z,
};
