//! Application error types.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Venue error: {0}")]
    Venue(#[from] arb_venue::VenueError),

    #[error("Detector error: {0}")]
    Detector(#[from] arb_detector::DetectorError),

    #[error("Executor error: {0}")]
    Executor(#[from] arb_executor::ExecutorError),

    #[error("Telemetry error: {0}")]
    Telemetry(#[from] arb_telemetry::TelemetryError),

    #[error("Preflight error: {0}")]
    Preflight(String),

    #[error("Close record error: {0}")]
    Record(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type AppResult<T> = Result<T, AppError>;
