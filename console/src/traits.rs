//! Service trait definitions for dependency injection

use async_trait::async_trait;
use shared::PortRange;

use crate::error::ConsoleResult;

/// Finds running simulator instances
#[mockall::automock]
#[async_trait]
pub trait InstanceScanner: Send + Sync {
    /// Live ports of `range`, in ascending order
    async fn scan(&self, range: PortRange) -> Vec<u16>;
}

/// Talks to one simulator instance
#[mockall::automock]
#[async_trait]
pub trait InstanceClient: Send + Sync {
    /// `GET {base_url}/{command}` and return the body of a 200 response
    ///
    /// A refused connection is reported as `ConnectionRefused`, distinct from
    /// other transport failures.
    async fn get(&self, base_url: &str, command: &str) -> ConsoleResult<String>;
}
