//! Divergence signal types.

use arb_core::{OrderSide, Price};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Which way the venue has diverged from the reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SignalDirection {
    /// Venue above reference: sell into bids, buy back later.
    Short,
    /// Venue below reference: buy up the asks.
    Long,
}

impl SignalDirection {
    /// Side of the sweep order this direction submits.
    pub fn sweep_side(&self) -> OrderSide {
        match self {
            Self::Short => OrderSide::Sell,
            Self::Long => OrderSide::Buy,
        }
    }
}

impl fmt::Display for SignalDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Short => write!(f, "short"),
            Self::Long => write!(f, "long"),
        }
    }
}

/// A detected divergence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DivergenceSignal {
    pub direction: SignalDirection,
    /// Venue last price at detection.
    pub venue_px: Price,
    /// Reference last price at detection.
    pub reference_px: Price,
    /// `|venue - reference| / reference`.
    pub divergence: Decimal,
    /// Execution target derived from the reference price.
    pub target_px: Price,
    pub detected_at: DateTime<Utc>,
}

impl DivergenceSignal {
    /// Signed divergence in percent, positive when the venue is rich.
    pub fn signed_pct(&self) -> Decimal {
        let pct = self.divergence.saturating_mul(Decimal::ONE_HUNDRED);
        match self.direction {
            SignalDirection::Short => pct,
            SignalDirection::Long => -pct,
        }
    }
}
