//! HTTP client for simulator instances

use async_trait::async_trait;
use std::error::Error as StdError;
use std::time::Duration;

use crate::error::{ConsoleError, ConsoleResult};
use crate::traits::InstanceClient;

pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone)]
pub struct HttpInstanceClient {
    client: reqwest::Client,
}

impl HttpInstanceClient {
    pub fn new(timeout: Duration) -> ConsoleResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ConsoleError::transport(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self { client })
    }
}

/// Whether the failure was the instance refusing the TCP connection
pub fn is_connection_refused(error: &reqwest::Error) -> bool {
    let mut source = error.source();
    while let Some(cause) = source {
        if let Some(io) = cause.downcast_ref::<std::io::Error>() {
            if io.kind() == std::io::ErrorKind::ConnectionRefused {
                return true;
            }
        }
        source = cause.source();
    }
    false
}

#[async_trait]
impl InstanceClient for HttpInstanceClient {
    async fn get(&self, base_url: &str, command: &str) -> ConsoleResult<String> {
        let url = format!("{}/{}", base_url, command);

        let response = self
            .client
            .get(&url)
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(|e| {
                if is_connection_refused(&e) {
                    ConsoleError::ConnectionRefused { url: url.clone() }
                } else {
                    ConsoleError::transport(e.to_string())
                }
            })?;

        if !response.status().is_success() {
            return Err(ConsoleError::protocol(format!(
                "server returned error status: {}",
                response.status()
            )));
        }

        response
            .text()
            .await
            .map_err(|e| ConsoleError::transport(format!("error reading response body: {}", e)))
    }
}
