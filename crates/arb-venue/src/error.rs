//! Collaborator error types.

use arb_core::CoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum VenueError {
    /// Request rejected before any I/O. Never retried.
    #[error("Validation error: {0}")]
    Validation(String),

    /// Collaborator answered but carried no usable value.
    #[error("Data unavailable: {0}")]
    DataUnavailable(String),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: String },

    #[error("Decode error: {0}")]
    Decode(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl VenueError {
    /// Whether a retry could plausibly succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            VenueError::Transport(_) | VenueError::Http { .. } | VenueError::Decode(_)
        )
    }
}

impl From<CoreError> for VenueError {
    fn from(e: CoreError) -> Self {
        match e {
            CoreError::Validation(msg) => VenueError::Validation(msg),
            other => VenueError::Validation(other.to_string()),
        }
    }
}

impl From<reqwest::Error> for VenueError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            VenueError::Decode(e.to_string())
        } else {
            VenueError::Transport(e.to_string())
        }
    }
}

pub type VenueResult<T> = Result<T, VenueError>;
