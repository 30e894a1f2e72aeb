//! Collaborator traits.
//!
//! Each trait method is one logical call. Implementations own their retry
//! policy and authentication; a returned error is final.

use crate::error::VenueResult;
use arb_core::{OrderBookSnapshot, OrderRequest, PriceQuote};
use serde::{Deserialize, Serialize};
use std::pin::Pin;
use std::sync::Arc;

/// Boxed future for dyn-compatible async trait methods.
pub type BoxFuture<'a, T> = Pin<Box<dyn std::future::Future<Output = T> + Send + 'a>>;

/// Last-price provider.
pub trait PriceSource: Send + Sync {
    /// Fetch the last traded price for `symbol`.
    ///
    /// Missing or non-positive prices are `VenueError::DataUnavailable`.
    fn last_price<'a>(&'a self, symbol: &'a str) -> BoxFuture<'a, VenueResult<PriceQuote>>;
}

/// Order-book snapshot provider.
pub trait OrderBookSource: Send + Sync {
    /// Fetch up to `depth` levels per side, best price first.
    fn order_book<'a>(
        &'a self,
        symbol: &'a str,
        depth: u32,
    ) -> BoxFuture<'a, VenueResult<OrderBookSnapshot>>;
}

/// Order placement and cancellation.
pub trait OrderGateway: Send + Sync {
    /// Validate and submit an order.
    fn place_order(&self, request: OrderRequest) -> BoxFuture<'_, VenueResult<PlacedOrder>>;

    /// Cancel a non-empty batch of positive order ids.
    fn cancel_orders(&self, order_ids: Vec<u64>) -> BoxFuture<'_, VenueResult<CancelReport>>;
}

/// Venue acknowledgement of a placed order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlacedOrder {
    /// Venue order id, when the response carried a positive integer one.
    pub id: Option<u64>,
    /// Full response body.
    pub raw: serde_json::Value,
}

impl PlacedOrder {
    /// Extract the order id from `id`, `orderId` or `order.id`.
    pub fn from_response(raw: serde_json::Value) -> Self {
        let candidates = [
            raw.get("id"),
            raw.get("orderId"),
            raw.get("order").and_then(|o| o.get("id")),
        ];
        let id = candidates
            .into_iter()
            .flatten()
            .find_map(|v| v.as_u64().filter(|id| *id > 0));
        Self { id, raw }
    }
}

/// Result of a batch cancel.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CancelReport {
    #[serde(default)]
    pub succeeded: Vec<serde_json::Value>,
    #[serde(default)]
    pub failed: Vec<serde_json::Value>,
}

impl CancelReport {
    pub fn all_succeeded(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Validate a cancel batch before it leaves the process.
pub fn validate_cancel_ids(order_ids: &[u64]) -> VenueResult<()> {
    if order_ids.is_empty() {
        return Err(crate::error::VenueError::Validation(
            "orderIds must be a non-empty array of integers".to_string(),
        ));
    }
    if order_ids.iter().any(|id| *id == 0) {
        return Err(crate::error::VenueError::Validation(
            "orderIds must contain only positive integers".to_string(),
        ));
    }
    Ok(())
}

pub type DynPriceSource = Arc<dyn PriceSource>;
pub type DynOrderBookSource = Arc<dyn OrderBookSource>;
pub type DynOrderGateway = Arc<dyn OrderGateway>;
