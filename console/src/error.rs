//! Console-specific error types

use thiserror::Error;
use shared::SharedError;

#[derive(Error, Debug)]
pub enum ConsoleError {
    #[error("Transport error: {message}")]
    TransportError { message: String },

    #[error("Connection refused by {url}")]
    ConnectionRefused { url: String },

    #[error("Simulator on port {port} is no longer running")]
    StaleSelection { port: u16 },

    #[error("Unexpected response: {message}")]
    ProtocolError { message: String },

    #[error("No simulator selected. Use 'rescan' or 'port <n>' first.")]
    NoSelection,

    #[error("History file error: {message}")]
    HistoryError { message: String },

    #[error("Cannot read input: {message}")]
    InputError { message: String },

    #[error("Shared component error: {0}")]
    SharedError(#[from] SharedError),

    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

impl ConsoleError {
    pub fn transport(message: impl Into<String>) -> Self {
        ConsoleError::TransportError { message: message.into() }
    }

    pub fn protocol(message: impl Into<String>) -> Self {
        ConsoleError::ProtocolError { message: message.into() }
    }

    pub fn history(message: impl Into<String>) -> Self {
        ConsoleError::HistoryError { message: message.into() }
    }

    pub fn input(message: impl Into<String>) -> Self {
        ConsoleError::InputError { message: message.into() }
    }
}

pub type ConsoleResult<T> = Result<T, ConsoleError>;
