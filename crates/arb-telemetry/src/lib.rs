//! Prometheus metrics and structured logging.
//!
//! - Prometheus metrics for signals, sweeps, ladder placement and monitoring sessions
//! - Structured JSON logging with tracing
//! - Periodic statistics summary

pub mod error;
pub mod logging;
pub mod metrics;
pub mod stats;

pub use error::{TelemetryError, TelemetryResult};
pub use logging::{init_logging, init_logging_with, LogFormat};
pub use metrics::Metrics;
pub use stats::{RunStats, StatsReporter};
