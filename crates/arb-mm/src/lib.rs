//! Defensive ladder maintenance.
//!
//! Keeps a symmetric set of standing limit orders around the venue's last
//! price, replaced wholesale whenever the floored price moves:
//!
//! ```text
//! tick() → price unchanged?  → no-op
//!        → cancel tracked set (batch, failures logged)
//!        → fetch book, gap per side
//!        → ladder_prices(): BUY below / SELL above current price
//!        → place both sides concurrently, record ids + price
//! ```

pub mod config;
pub mod ladder;
pub mod maintainer;

pub use config::LadderConfig;
pub use ladder::{ladder_prices, LadderOrderSet};
pub use maintainer::{
    LadderMaintainer, LadderState, LadderTickOutcome, LadderTickReport, LevelFailure,
};
