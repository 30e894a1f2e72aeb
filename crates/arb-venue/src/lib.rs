//! Quote and order collaborators.
//!
//! Everything that talks to the outside world lives here:
//! - `PriceSource`, `OrderBookSource`, `OrderGateway`: collaborator traits
//! - `VenueRestClient`: REST binding for the trading venue
//! - `ReferenceFeedClient`: candle-history binding for the reference feed
//! - `RetryPolicy`: bounded attempts with a fixed delay, applied inside every binding
//! - `MockVenue`: in-memory collaborator for tests
//!
//! Callers treat each collaborator call as atomic and never retry on top.

pub mod collaborator;
pub mod config;
pub mod error;
pub mod mock;
pub mod reference;
pub mod rest;
pub mod retry;

pub use collaborator::{
    BoxFuture, CancelReport, DynOrderBookSource, DynOrderGateway, DynPriceSource,
    OrderBookSource, OrderGateway, PlacedOrder, PriceSource,
};
pub use config::{ReferenceConfig, VenueConfig};
pub use error::{VenueError, VenueResult};
pub use mock::MockVenue;
pub use reference::ReferenceFeedClient;
pub use rest::VenueRestClient;
pub use retry::RetryPolicy;
