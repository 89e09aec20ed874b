//! Service implementations
//!
//! Real network-facing implementations of the console's service traits.

pub mod discovery;
pub mod instance_client;

#[cfg(test)]
pub mod tests;

// Re-export all service implementations
pub use discovery::TcpInstanceScanner;
pub use instance_client::HttpInstanceClient;
