//! Error types for pollcal.

use thiserror::Error;

/// Errors that can occur below the public store surface.
///
/// Store operations never return these to callers; they are logged and
/// converted into empty or unchanged results.
#[derive(Error, Debug)]
pub enum PollCalError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Invalid date: {0}")]
    InvalidDate(String),

    #[error("Storage unavailable: {0}")]
    Unavailable(String),
}

impl From<serde_json::Error> for PollCalError {
    fn from(err: serde_json::Error) -> Self {
        PollCalError::Serialization(err.to_string())
    }
}

/// Result type alias for pollcal operations.
pub type PollCalResult<T> = Result<T, PollCalError>;
