//! Structured logging initialization.

use crate::error::{TelemetryError, TelemetryResult};
use std::str::FromStr;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const DEFAULT_FILTER: &str = "info,arb=debug";

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// One JSON object per event, with span context.
    Json,
    /// Multi-line human readable output.
    Pretty,
    /// Single-line human readable output.
    Compact,
}

impl FromStr for LogFormat {
    type Err = TelemetryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "pretty" => Ok(Self::Pretty),
            "compact" => Ok(Self::Compact),
            other => Err(TelemetryError::LoggingInit(format!(
                "unknown log format '{other}'"
            ))),
        }
    }
}

impl LogFormat {
    /// Resolve the format from `ARB_LOG_FORMAT`, then `RUST_ENV`.
    ///
    /// `RUST_ENV=production` selects JSON; anything else is pretty.
    pub fn from_env_values(log_format: Option<&str>, rust_env: Option<&str>) -> TelemetryResult<Self> {
        if let Some(format) = log_format {
            return format.parse();
        }
        Ok(match rust_env {
            Some("production") => Self::Json,
            _ => Self::Pretty,
        })
    }
}

/// Initialize structured logging.
///
/// Filtering follows `RUST_LOG`, defaulting to `info,arb=debug`.
/// Fails if a global subscriber is already installed.
pub fn init_logging() -> TelemetryResult<()> {
    let format = LogFormat::from_env_values(
        std::env::var("ARB_LOG_FORMAT").ok().as_deref(),
        std::env::var("RUST_ENV").ok().as_deref(),
    )?;
    init_logging_with(format)
}

/// Initialize structured logging with an explicit format.
pub fn init_logging_with(format: LogFormat) -> TelemetryResult<()> {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    let registry = tracing_subscriber::registry().with(env_filter);

    let result = match format {
        LogFormat::Json => registry
            .with(
                fmt::layer()
                    .json()
                    .with_current_span(true)
                    .with_span_list(true),
            )
            .try_init(),
        LogFormat::Pretty => registry
            .with(fmt::layer().pretty().with_target(true))
            .try_init(),
        LogFormat::Compact => registry
            .with(fmt::layer().compact().with_target(false))
            .try_init(),
    };

    result.map_err(|e| TelemetryError::LoggingInit(e.to_string()))
}
