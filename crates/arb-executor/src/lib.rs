//! Execution engine for divergence signals.
//!
//! Provides:
//! - Liquidity sweep sizing against a pre-sorted book side
//! - Short path: market SELL sweep, ladder refresh, buy-back monitoring session
//! - Long path: notional-denominated market BUY sweep
//! - Per-symbol session ownership so monitoring sessions never overlap
//!
//! # Architecture
//!
//! ```text
//! DivergenceSignal → ExecutionOrchestrator
//!                     ├─ SessionRegistry: reject if a session is active (short)
//!                     ├─ sweep_bids / sweep_asks: size the order
//!                     ├─ OrderGateway: market order
//!                     ├─ LadderMaintainer.tick(force) (short)
//!                     └─ MonitoringSession::run (spawned, short)
//! ```

pub mod config;
pub mod error;
pub mod orchestrator;
pub mod registry;
pub mod session;
pub mod sweep;

pub use config::{ExecutionConfig, SessionConfig};
pub use error::{ExecutorError, ExecutorResult};
pub use orchestrator::{ExecutionOrchestrator, LongExecution, ShortExecution};
pub use registry::{SessionGuard, SessionRegistry};
pub use session::{MonitoringSession, PollEvent, SessionOutcome, SessionReport, SessionState};
pub use sweep::{sweep_asks, sweep_bids, SweepResult};
