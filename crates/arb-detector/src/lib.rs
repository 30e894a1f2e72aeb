//! Divergence detection between a reference feed and the trading venue.
//!
//! Computes the relative gap between the two last prices and classifies it
//! as a short signal (venue rich), a long signal (venue cheap), or nothing.

pub mod config;
pub mod detector;
pub mod error;
pub mod signal;

pub use config::DetectorConfig;
pub use detector::{relative_divergence, should_long, should_short, DivergenceDetector};
pub use error::{DetectorError, DetectorResult};
pub use signal::{DivergenceSignal, SignalDirection};
