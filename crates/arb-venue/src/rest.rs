//! REST binding for the trading venue.
//!
//! Endpoints:
//! - `GET  {market_url}/market/rollingprice?from={tag}&symbol={symbol}`
//! - `GET  {market_url}/market/order?symbol={symbol}&limit={depth}`
//! - `GET  {base_url}/market/symbols/symbol/{symbol}`
//! - `POST {base_url}/orders`
//! - `POST {base_url}/orders/cancel`

use crate::collaborator::{
    validate_cancel_ids, BoxFuture, CancelReport, OrderBookSource, OrderGateway, PlacedOrder,
    PriceSource,
};
use crate::config::VenueConfig;
use crate::error::{VenueError, VenueResult};
use crate::retry::check_status;
use arb_core::{OrderBookSnapshot, OrderRequest, Price, PriceQuote};
use reqwest::{Client, RequestBuilder};
use serde::Serialize;
use std::time::Duration;
use tracing::{debug, info, warn};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CancelRequest<'a> {
    order_ids: &'a [u64],
}

/// Venue REST client.
pub struct VenueRestClient {
    client: Client,
    config: VenueConfig,
    token: Option<String>,
}

impl VenueRestClient {
    /// Create a new client. The bearer token is read from the environment
    /// variable named by `config.api_token_env`.
    pub fn new(config: VenueConfig) -> VenueResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_millis(config.request_timeout_ms))
            .build()
            .map_err(|e| VenueError::InvalidConfig(format!("Failed to create HTTP client: {e}")))?;

        let token = std::env::var(&config.api_token_env)
            .ok()
            .filter(|t| !t.trim().is_empty());
        if token.is_none() {
            warn!(
                env = %config.api_token_env,
                "Venue API token not set, order endpoints will be rejected"
            );
        }

        Ok(Self {
            client,
            config,
            token,
        })
    }

    pub fn config(&self) -> &VenueConfig {
        &self.config
    }

    fn authorized(&self, builder: RequestBuilder) -> RequestBuilder {
        match &self.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    /// Extract `body[symbol].lastPrice`.
    pub fn parse_last_price(body: &serde_json::Value, symbol: &str) -> VenueResult<PriceQuote> {
        let raw = body
            .get(symbol)
            .and_then(|entry| entry.get("lastPrice"))
            .filter(|v| !v.is_null())
            .ok_or_else(|| {
                VenueError::DataUnavailable(format!("venue last price for {symbol} is empty"))
            })?;

        let price = Price::from_json(raw).ok_or_else(|| {
            VenueError::DataUnavailable(format!("venue last price for {symbol} is invalid: {raw}"))
        })?;
        Ok(PriceQuote::new(price))
    }

    async fn fetch_last_price(&self, symbol: &str) -> VenueResult<PriceQuote> {
        let url = format!("{}/market/rollingprice", self.config.market_url);
        let response = self
            .authorized(self.client.get(&url))
            .query(&[("from", self.config.price_feed_tag.as_str()), ("symbol", symbol)])
            .send()
            .await?;
        let body: serde_json::Value = check_status(response).await?.json().await?;
        Self::parse_last_price(&body, symbol)
    }

    async fn fetch_order_book(&self, symbol: &str, depth: u32) -> VenueResult<OrderBookSnapshot> {
        let url = format!("{}/market/order", self.config.market_url);
        let limit = depth.to_string();
        let response = self
            .client
            .get(&url)
            .query(&[("symbol", symbol), ("limit", limit.as_str())])
            .send()
            .await?;
        let body: serde_json::Value = check_status(response).await?.json().await?;
        if !body.is_object() {
            return Err(VenueError::DataUnavailable(format!(
                "order book for {symbol} is not an object"
            )));
        }
        Ok(OrderBookSnapshot::from_json(&body))
    }

    async fn submit_order(&self, request: &OrderRequest) -> VenueResult<PlacedOrder> {
        let url = format!("{}/orders", self.config.base_url);
        let response = self
            .authorized(self.client.post(&url))
            .json(request)
            .send()
            .await?;
        let body: serde_json::Value = check_status(response).await?.json().await?;
        Ok(PlacedOrder::from_response(body))
    }

    async fn submit_cancel(&self, order_ids: &[u64]) -> VenueResult<CancelReport> {
        let url = format!("{}/orders/cancel", self.config.base_url);
        let response = self
            .authorized(self.client.post(&url))
            .json(&CancelRequest { order_ids })
            .send()
            .await?;
        let report: CancelReport = check_status(response).await?.json().await?;
        Ok(report)
    }

    /// Fetch the venue's symbol descriptor. Used as a start-up check.
    pub async fn symbol_info(&self, symbol: &str) -> VenueResult<serde_json::Value> {
        self.config
            .retry
            .run("venue_symbol_info", || async move {
                let url = format!("{}/market/symbols/symbol/{}", self.config.base_url, symbol);
                let response = self.authorized(self.client.get(&url)).send().await?;
                let body: serde_json::Value = check_status(response).await?.json().await?;
                Ok(body)
            })
            .await
    }
}

impl PriceSource for VenueRestClient {
    fn last_price<'a>(&'a self, symbol: &'a str) -> BoxFuture<'a, VenueResult<PriceQuote>> {
        Box::pin(async move {
            let quote = self
                .config
                .retry
                .run("venue_price", || self.fetch_last_price(symbol))
                .await?;
            debug!(symbol, price = %quote.value, "Venue last price");
            Ok(quote)
        })
    }
}

impl OrderBookSource for VenueRestClient {
    fn order_book<'a>(
        &'a self,
        symbol: &'a str,
        depth: u32,
    ) -> BoxFuture<'a, VenueResult<OrderBookSnapshot>> {
        Box::pin(async move {
            self.config
                .retry
                .run("venue_order_book", || self.fetch_order_book(symbol, depth))
                .await
        })
    }
}

impl OrderGateway for VenueRestClient {
    fn place_order(&self, request: OrderRequest) -> BoxFuture<'_, VenueResult<PlacedOrder>> {
        Box::pin(async move {
            request.validate()?;
            let placed = self
                .config
                .retry
                .run("place_order", || self.submit_order(&request))
                .await?;
            info!(
                symbol = %request.symbol,
                side = %request.side,
                order_type = %request.order_type,
                order_id = ?placed.id,
                source = ?request.source,
                "Order placed"
            );
            Ok(placed)
        })
    }

    fn cancel_orders(&self, order_ids: Vec<u64>) -> BoxFuture<'_, VenueResult<CancelReport>> {
        Box::pin(async move {
            validate_cancel_ids(&order_ids)?;
            self.config
                .retry
                .run("cancel_orders", || self.submit_cancel(&order_ids))
                .await
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use serde_json::json;

    #[test]
    fn test_parse_last_price() {
        let body = json!({"AHRM1IRR": {"lastPrice": 12345, "volume": 10}});
        let quote = VenueRestClient::parse_last_price(&body, "AHRM1IRR").unwrap();
        assert_eq!(quote.value.inner(), dec!(12345));
    }

    #[test]
    fn test_parse_last_price_string() {
        let body = json!({"AHRM1IRR": {"lastPrice": "12345.5"}});
        let quote = VenueRestClient::parse_last_price(&body, "AHRM1IRR").unwrap();
        assert_eq!(quote.value.inner(), dec!(12345.5));
    }

    #[test]
    fn test_parse_last_price_missing() {
        let body = json!({"OTHER": {"lastPrice": 1}});
        assert!(matches!(
            VenueRestClient::parse_last_price(&body, "AHRM1IRR"),
            Err(VenueError::DataUnavailable(_))
        ));

        let body = json!({"AHRM1IRR": {"lastPrice": null}});
        assert!(matches!(
            VenueRestClient::parse_last_price(&body, "AHRM1IRR"),
            Err(VenueError::DataUnavailable(_))
        ));
    }

    #[test]
    fn test_parse_last_price_not_numeric() {
        let body = json!({"AHRM1IRR": {"lastPrice": "n/a"}});
        let err = VenueRestClient::parse_last_price(&body, "AHRM1IRR").unwrap_err();
        assert!(!err.is_retryable());
    }

    #[test]
    fn test_cancel_request_wire_format() {
        let ids = [3u64, 4];
        let value = serde_json::to_value(CancelRequest { order_ids: &ids }).unwrap();
        assert_eq!(value, json!({"orderIds": [3, 4]}));
    }

    #[tokio::test]
    async fn test_place_order_validates_before_io() {
        let client = VenueRestClient::new(VenueConfig {
            base_url: "http://127.0.0.1:9".to_string(),
            ..Default::default()
        })
        .unwrap();
        let request = OrderRequest::market_buy("AHRM1IRR", "IRR", dec!(0));
        let err = client.place_order(request).await.unwrap_err();
        assert!(matches!(err, VenueError::Validation(_)));

        let err = client.cancel_orders(vec![]).await.unwrap_err();
        assert!(matches!(err, VenueError::Validation(_)));
    }
}
