//! Order-book snapshot types.
//!
//! Levels arrive best-first from the venue (highest bid first, lowest ask
//! first). This ordering is relied upon by the sweep and is not re-checked.

use crate::decimal::{decimal_from_json, Price, Size};
use serde::{Deserialize, Serialize};

/// A single `(price, quantity)` level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookLevel {
    pub price: Price,
    pub quantity: Size,
}

impl BookLevel {
    pub fn new(price: Price, quantity: Size) -> Self {
        Self { price, quantity }
    }

    /// Positive price and non-negative quantity.
    pub fn is_well_formed(&self) -> bool {
        self.price.is_positive() && !self.quantity.inner().is_sign_negative()
    }

    /// Parse a `[price, quantity]` pair. Extra trailing elements are ignored.
    pub fn from_json(value: &serde_json::Value) -> Option<Self> {
        let pair = value.as_array()?;
        let price = decimal_from_json(pair.first()?)?;
        let quantity = decimal_from_json(pair.get(1)?)?;
        Some(Self::new(Price::new(price), Size::new(quantity)))
    }
}

/// One side of the book, best price first.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderBookSide {
    levels: Vec<BookLevel>,
}

impl OrderBookSide {
    pub fn new(levels: Vec<BookLevel>) -> Self {
        Self { levels }
    }

    /// Build from raw `[[price, qty], ...]` JSON, dropping entries that
    /// are not numeric pairs.
    pub fn from_json(value: &serde_json::Value) -> Self {
        let levels = value
            .as_array()
            .map(|arr| arr.iter().filter_map(BookLevel::from_json).collect())
            .unwrap_or_default();
        Self { levels }
    }

    pub fn levels(&self) -> &[BookLevel] {
        &self.levels
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    /// Top-of-book price, if any level exists.
    pub fn best_price(&self) -> Option<Price> {
        self.levels.first().map(|l| l.price)
    }
}

impl From<Vec<(Price, Size)>> for OrderBookSide {
    fn from(levels: Vec<(Price, Size)>) -> Self {
        Self::new(
            levels
                .into_iter()
                .map(|(p, q)| BookLevel::new(p, q))
                .collect(),
        )
    }
}

/// Bid and ask depth captured at a single instant.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderBookSnapshot {
    pub bids: OrderBookSide,
    pub asks: OrderBookSide,
}

impl OrderBookSnapshot {
    pub fn new(bids: OrderBookSide, asks: OrderBookSide) -> Self {
        Self { bids, asks }
    }

    /// Parse `{"bids": [[p,q]...], "asks": [[p,q]...]}`. Missing sides are empty.
    pub fn from_json(value: &serde_json::Value) -> Self {
        Self {
            bids: value
                .get("bids")
                .map(OrderBookSide::from_json)
                .unwrap_or_default(),
            asks: value
                .get("asks")
                .map(OrderBookSide::from_json)
                .unwrap_or_default(),
        }
    }
}
