//! Executor error types.

use arb_detector::SignalDirection;
use arb_venue::VenueError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExecutorError {
    /// Sweep produced nothing to trade. No order was submitted.
    #[error("No qualifying liquidity for {direction}: {reason}")]
    NoQualifyingLiquidity {
        direction: SignalDirection,
        reason: String,
    },

    /// A monitoring session already owns this symbol.
    #[error("Monitoring session already active for {0}")]
    SessionActive(String),

    #[error("Venue error: {0}")]
    Venue(#[from] VenueError),
}

pub type ExecutorResult<T> = Result<T, ExecutorError>;
