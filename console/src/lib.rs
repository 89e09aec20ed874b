//! Operator console library
//!
//! Finds simulator instances by probing the discovery port range and lets an
//! operator query or stop them one at a time.

pub mod error;
pub mod types;
pub mod traits;
pub mod state;
pub mod console_impl;
pub mod services;

// Re-export main types
pub use console_impl::Console;
pub use error::{ConsoleError, ConsoleResult};
pub use state::ConsoleSession;
pub use types::*;
pub use traits::*;

// Re-export service implementations
pub use services::{HttpInstanceClient, TcpInstanceScanner};
