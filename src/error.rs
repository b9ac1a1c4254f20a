//! Crate-wide error type.

use std::time::Duration;

/// Failures raised by the clients, the session and the user actions.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("request failed with status {status}: {message}")]
    Status { status: u16, message: String },

    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    #[error("request cancelled")]
    Cancelled,

    #[error("host sdk error: {0}")]
    Sdk(String),

    #[error("invalid response: {0}")]
    Decode(String),

    #[error("invalid input: {0}")]
    Invalid(String),

    #[error("session is not ready")]
    NotReady,

    #[error("storage error: {0}")]
    Storage(#[from] std::io::Error),
}

impl Error {
    /// HTTP status carried by the failure, if the remote side answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::Status { status, .. } => Some(*status),
            Error::Transport(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, Error::Cancelled)
    }
}

pub type Result<T> = std::result::Result<T, Error>;
