//! Venue/reference divergence arbitrage bot.
//!
//! Main application wiring every component together:
//! - Divergence detection between the venue and the reference feed
//! - Sweep execution with buy-back monitoring sessions
//! - Two-sided ladder maintenance around the venue last price
//! - Daily reference close capture

pub mod app;
pub mod close_recorder;
pub mod config;
pub mod error;

pub use app::Application;
pub use close_recorder::{CloseRecord, CloseRecorder};
pub use config::AppConfig;
pub use error::{AppError, AppResult};
