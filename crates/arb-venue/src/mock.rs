//! In-memory collaborator for tests.
//!
//! Records every call and returns scripted responses.

use crate::collaborator::{
    validate_cancel_ids, BoxFuture, CancelReport, OrderBookSource, OrderGateway, PlacedOrder,
    PriceSource,
};
use crate::error::{VenueError, VenueResult};
use arb_core::{OrderBookSnapshot, OrderRequest, Price, PriceQuote};
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};

/// Mock venue implementing every collaborator trait.
#[derive(Debug)]
pub struct MockVenue {
    /// Prices returned in order; `None` entries simulate a failed fetch.
    price_script: Mutex<VecDeque<Option<Price>>>,
    /// Returned once the script is exhausted.
    steady_price: Mutex<Option<Price>>,
    book: Mutex<Option<OrderBookSnapshot>>,
    placed: Mutex<Vec<OrderRequest>>,
    cancels: Mutex<Vec<Vec<u64>>>,
    failing_prices: Mutex<Vec<Price>>,
    reject_cancels: AtomicBool,
    next_order_id: AtomicU64,
    price_calls: AtomicUsize,
    book_calls: AtomicUsize,
}

impl Default for MockVenue {
    fn default() -> Self {
        Self::new()
    }
}

impl MockVenue {
    pub fn new() -> Self {
        Self {
            price_script: Mutex::new(VecDeque::new()),
            steady_price: Mutex::new(None),
            book: Mutex::new(None),
            placed: Mutex::new(Vec::new()),
            cancels: Mutex::new(Vec::new()),
            failing_prices: Mutex::new(Vec::new()),
            reject_cancels: AtomicBool::new(false),
            next_order_id: AtomicU64::new(1),
            price_calls: AtomicUsize::new(0),
            book_calls: AtomicUsize::new(0),
        }
    }

    /// Price returned whenever the script is empty. `None` means unavailable.
    pub fn set_price(&self, price: Option<Price>) {
        *self.steady_price.lock() = price;
    }

    /// Queue one-shot price responses consumed before the steady price.
    pub fn script_prices(&self, prices: impl IntoIterator<Item = Option<Price>>) {
        self.price_script.lock().extend(prices);
    }

    pub fn set_book(&self, book: Option<OrderBookSnapshot>) {
        *self.book.lock() = book;
    }

    /// Fail every order placed at `price`.
    pub fn fail_orders_at(&self, price: Price) {
        self.failing_prices.lock().push(price);
    }

    /// Report every id as failed on cancel.
    pub fn set_reject_cancels(&self, reject: bool) {
        self.reject_cancels.store(reject, Ordering::SeqCst);
    }

    pub fn placed_orders(&self) -> Vec<OrderRequest> {
        self.placed.lock().clone()
    }

    pub fn cancel_batches(&self) -> Vec<Vec<u64>> {
        self.cancels.lock().clone()
    }

    pub fn price_calls(&self) -> usize {
        self.price_calls.load(Ordering::SeqCst)
    }

    pub fn book_calls(&self) -> usize {
        self.book_calls.load(Ordering::SeqCst)
    }

    /// Forget recorded orders and cancels.
    pub fn clear_calls(&self) {
        self.placed.lock().clear();
        self.cancels.lock().clear();
    }
}

impl PriceSource for MockVenue {
    fn last_price<'a>(&'a self, _symbol: &'a str) -> BoxFuture<'a, VenueResult<PriceQuote>> {
        Box::pin(async move {
            self.price_calls.fetch_add(1, Ordering::SeqCst);
            let next = self
                .price_script
                .lock()
                .pop_front()
                .unwrap_or_else(|| *self.steady_price.lock());
            next.map(PriceQuote::new)
                .ok_or_else(|| VenueError::DataUnavailable("mock price unavailable".to_string()))
        })
    }
}

impl OrderBookSource for MockVenue {
    fn order_book<'a>(
        &'a self,
        _symbol: &'a str,
        _depth: u32,
    ) -> BoxFuture<'a, VenueResult<OrderBookSnapshot>> {
        Box::pin(async move {
            self.book_calls.fetch_add(1, Ordering::SeqCst);
            self.book
                .lock()
                .clone()
                .ok_or_else(|| VenueError::Transport("mock order book unavailable".to_string()))
        })
    }
}

impl OrderGateway for MockVenue {
    fn place_order(&self, request: OrderRequest) -> BoxFuture<'_, VenueResult<PlacedOrder>> {
        Box::pin(async move {
            request.validate()?;
            let fails = request
                .price
                .map(|p| self.failing_prices.lock().contains(&p))
                .unwrap_or(false);
            self.placed.lock().push(request);
            if fails {
                return Err(VenueError::Http {
                    status: 500,
                    body: "mock rejection".to_string(),
                });
            }
            let id = self.next_order_id.fetch_add(1, Ordering::SeqCst);
            Ok(PlacedOrder::from_response(serde_json::json!({ "id": id })))
        })
    }

    fn cancel_orders(&self, order_ids: Vec<u64>) -> BoxFuture<'_, VenueResult<CancelReport>> {
        Box::pin(async move {
            validate_cancel_ids(&order_ids)?;
            self.cancels.lock().push(order_ids.clone());
            let ids: Vec<serde_json::Value> = order_ids.into_iter().map(Into::into).collect();
            if self.reject_cancels.load(Ordering::SeqCst) {
                Ok(CancelReport {
                    succeeded: Vec::new(),
                    failed: ids,
                })
            } else {
                Ok(CancelReport {
                    succeeded: ids,
                    failed: Vec::new(),
                })
            }
        })
    }
}
