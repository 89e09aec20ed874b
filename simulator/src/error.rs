//! Simulator-specific error types

use thiserror::Error;
use shared::{PortRange, SharedError};

#[derive(Error, Debug)]
pub enum SimulatorError {
    #[error("No port available in range {range}")]
    NoPortAvailable { range: PortRange, cancelled: bool },

    #[error("Dispatcher transport error: {message}")]
    TransportError { message: String },

    #[error("Dispatcher protocol error: {message}")]
    ProtocolError { message: String },

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Simulation engine error: {message}")]
    EngineError { message: String },

    #[error("Shared component error: {0}")]
    SharedError(#[from] SharedError),

    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Invalid URL: {0}")]
    UrlError(#[from] url::ParseError),

    #[error("Task join error: {0}")]
    JoinError(#[from] tokio::task::JoinError),
}

impl SimulatorError {
    pub fn transport(message: impl Into<String>) -> Self {
        SimulatorError::TransportError { message: message.into() }
    }

    pub fn protocol(message: impl Into<String>) -> Self {
        SimulatorError::ProtocolError { message: message.into() }
    }

    pub fn config(message: impl Into<String>) -> Self {
        SimulatorError::ConfigError { message: message.into() }
    }

    pub fn engine(message: impl Into<String>) -> Self {
        SimulatorError::EngineError { message: message.into() }
    }
}

pub type SimulatorResult<T> = Result<T, SimulatorError>;
