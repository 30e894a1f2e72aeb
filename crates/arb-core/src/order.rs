//! Order-related types and request validation.
//!
//! `OrderRequest` mirrors the venue's order-creation payload. Validation is
//! purely structural and runs before any network call.

use crate::decimal::{Price, Size};
use crate::error::{CoreError, Result};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Order side: buy or sell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum OrderSide {
    Buy,
    Sell,
}

impl OrderSide {
    /// Returns the opposite side.
    pub fn opposite(&self) -> Self {
        match self {
            Self::Buy => Self::Sell,
            Self::Sell => Self::Buy,
        }
    }

    /// Returns -1 for buy, +1 for sell.
    ///
    /// Ladder levels are offset below the current price for buys and above
    /// it for sells.
    pub fn ladder_direction(&self) -> i64 {
        match self {
            Self::Buy => -1,
            Self::Sell => 1,
        }
    }
}

impl fmt::Display for OrderSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Buy => write!(f, "BUY"),
            Self::Sell => write!(f, "SELL"),
        }
    }
}

/// Order type accepted by the venue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OrderType {
    #[serde(rename = "market")]
    Market,
    #[serde(rename = "limit")]
    Limit,
    #[serde(rename = "stopLimit")]
    StopLimit,
    #[serde(rename = "OCO")]
    Oco,
}

impl fmt::Display for OrderType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Market => write!(f, "market"),
            Self::Limit => write!(f, "limit"),
            Self::StopLimit => write!(f, "stopLimit"),
            Self::Oco => write!(f, "OCO"),
        }
    }
}

/// Order submission request.
///
/// Exactly one of `amount` (base units) and `total_amount` (quote notional)
/// is set: market BUY orders are denominated in quote, everything else in base.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderRequest {
    pub symbol: String,
    pub side: OrderSide,
    pub order_type: OrderType,
    pub market: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<Size>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_amount: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<Price>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stop_price: Option<Price>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pair_order: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub originated_from: Option<String>,
    /// Client tag identifying which mechanism produced the order.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_data: Option<String>,
}

impl OrderRequest {
    fn base(symbol: &str, side: OrderSide, order_type: OrderType, market: &str) -> Self {
        Self {
            symbol: symbol.to_string(),
            side,
            order_type,
            market: market.to_string(),
            amount: None,
            total_amount: None,
            price: None,
            stop_price: None,
            pair_order: None,
            originated_from: None,
            source: None,
            source_data: None,
        }
    }

    /// Limit order for `amount` base units at `price`.
    pub fn limit(symbol: &str, side: OrderSide, market: &str, amount: Size, price: Price) -> Self {
        Self {
            amount: Some(amount),
            price: Some(price),
            ..Self::base(symbol, side, OrderType::Limit, market)
        }
    }

    /// Market SELL of `amount` base units.
    pub fn market_sell(symbol: &str, market: &str, amount: Size) -> Self {
        Self {
            amount: Some(amount),
            ..Self::base(symbol, OrderSide::Sell, OrderType::Market, market)
        }
    }

    /// Market BUY spending `total_amount` of quote currency.
    pub fn market_buy(symbol: &str, market: &str, total_amount: Decimal) -> Self {
        Self {
            total_amount: Some(total_amount),
            ..Self::base(symbol, OrderSide::Buy, OrderType::Market, market)
        }
    }

    /// Stop-limit order.
    pub fn stop_limit(
        symbol: &str,
        side: OrderSide,
        market: &str,
        amount: Size,
        price: Price,
        stop_price: Price,
    ) -> Self {
        Self {
            amount: Some(amount),
            price: Some(price),
            stop_price: Some(stop_price),
            ..Self::base(symbol, side, OrderType::StopLimit, market)
        }
    }

    /// Tag the request with its originating mechanism.
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    fn has_amount(&self) -> bool {
        self.amount.map(|a| !a.is_zero()).unwrap_or(false)
    }

    fn has_total_amount(&self) -> bool {
        self.total_amount.map(|t| !t.is_zero()).unwrap_or(false)
    }

    fn has_price(&self) -> bool {
        self.price.map(|p| !p.is_zero()).unwrap_or(false)
    }

    fn has_stop_price(&self) -> bool {
        self.stop_price.map(|p| !p.is_zero()).unwrap_or(false)
    }

    fn has_pair_order(&self) -> bool {
        self.pair_order
            .as_ref()
            .map(|p| !p.is_null())
            .unwrap_or(false)
    }

    /// Structural validation.
    ///
    /// A numeric field counts as set only when present and non-zero.
    pub fn validate(&self) -> Result<()> {
        if self.symbol.trim().is_empty() || self.market.trim().is_empty() {
            return Err(CoreError::Validation(
                "Missing required parameters: symbol, side, orderType, market".to_string(),
            ));
        }

        if self.order_type == OrderType::Market && self.side == OrderSide::Buy {
            if !self.has_total_amount() {
                return Err(CoreError::Validation(
                    "totalAmount is required for market BUY orders".to_string(),
                ));
            }
            if self.has_amount() {
                return Err(CoreError::Validation(
                    "amount cannot be used with totalAmount for market BUY orders".to_string(),
                ));
            }
        } else {
            if !self.has_amount() {
                return Err(CoreError::Validation(format!(
                    "amount is required for {} {} orders",
                    self.order_type, self.side
                )));
            }
            if self.has_total_amount() {
                return Err(CoreError::Validation(
                    "totalAmount can only be used with market BUY orders".to_string(),
                ));
            }
        }

        if self.order_type == OrderType::Oco && !self.has_pair_order() {
            return Err(CoreError::Validation(
                "pairOrder is required for OCO orders".to_string(),
            ));
        }

        if matches!(self.order_type, OrderType::StopLimit | OrderType::Oco) && !self.has_stop_price()
        {
            return Err(CoreError::Validation(
                "stopPrice is required for stopLimit and OCO orders".to_string(),
            ));
        }

        if self.order_type == OrderType::Limit && !self.has_price() {
            return Err(CoreError::Validation(
                "price is required for limit orders".to_string(),
            ));
        }

        Ok(())
    }
}
