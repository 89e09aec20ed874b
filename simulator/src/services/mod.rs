//! Service implementations
//!
//! Everything in the control plane that touches the network or the host:
//! port allocation, the HTTP status endpoint, dispatcher reporting and host
//! profiling.

pub mod dispatcher;
pub mod host_profile;
pub mod port_allocator;
pub mod status_endpoint;

#[cfg(test)]
pub mod tests;

// Re-export all service implementations
pub use dispatcher::{DispatcherReporter, HttpDispatchTransport};
pub use port_allocator::PortAllocator;
pub use status_endpoint::{StatusEndpoint, build_snapshot};
