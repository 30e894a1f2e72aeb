//! Core domain types for the divergence arbitrage bot.
//!
//! This crate provides fundamental types used throughout the trading system:
//! - `Price`, `Size`: Precision-safe numeric types
//! - `OrderSide`, `OrderType`, `OrderRequest`: Order submission model and its validation
//! - `OrderBookSide`, `OrderBookSnapshot`: Pre-sorted depth used by the sweep
//! - `PriceQuote`: A single observed last price

pub mod book;
pub mod decimal;
pub mod error;
pub mod order;
pub mod quote;

pub use book::{BookLevel, OrderBookSide, OrderBookSnapshot};
pub use decimal::{Price, Size};
pub use error::{CoreError, Result};
pub use order::{OrderRequest, OrderSide, OrderType};
pub use quote::{PriceQuote, QuoteSource};
