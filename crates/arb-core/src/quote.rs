//! Observed prices.

use crate::decimal::Price;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Which feed produced a quote.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuoteSource {
    /// Reference feed the venue is expected to track.
    Reference,
    /// The trading venue itself.
    Venue,
}

impl fmt::Display for QuoteSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Reference => write!(f, "reference"),
            Self::Venue => write!(f, "venue"),
        }
    }
}

/// A last-price observation. Immutable once produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceQuote {
    pub value: Price,
    pub timestamp: DateTime<Utc>,
}

impl PriceQuote {
    pub fn new(value: Price) -> Self {
        Self {
            value,
            timestamp: Utc::now(),
        }
    }

    pub fn at(value: Price, timestamp: DateTime<Utc>) -> Self {
        Self { value, timestamp }
    }
}
