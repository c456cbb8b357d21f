//! HTTP-backed [`PriceSource`], querying the inventory service directly
//! rather than through the event bus: a price lookup is a synchronous
//! read needed inline in `create_order`, not a saga step.

use saga_core::pricing::PriceSource;
use saga_core::{Money, ProductId};
use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;

/// Resolves prices via `GET {inventory_service_url}/products/prices`.
#[derive(Clone)]
pub struct InventoryPriceClient {
    http: reqwest::Client,
    base_url: String,
}

impl InventoryPriceClient {
    /// Builds a client against `base_url` (e.g. `http://inventory-service:8082`).
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self { http: reqwest::Client::new(), base_url: base_url.into() }
    }
}

impl PriceSource for InventoryPriceClient {
    fn prices(
        &self,
        product_ids: &[ProductId],
    ) -> Pin<Box<dyn Future<Output = HashMap<ProductId, Money>> + Send + '_>> {
        let ids = product_ids.iter().map(ProductId::to_string).collect::<Vec<_>>().join(",");
        Box::pin(async move {
            if ids.is_empty() {
                return HashMap::new();
            }

            let url = format!("{}/products/prices", self.base_url);
            let response = match self.http.get(&url).query(&[("id", ids)]).send().await {
                Ok(response) => response,
                Err(err) => {
                    tracing::warn!(%err, "price lookup against inventory service failed");
                    return HashMap::new();
                },
            };

            if !response.status().is_success() {
                tracing::warn!(status = %response.status(), "inventory service rejected price lookup");
                return HashMap::new();
            }

            match response.json::<HashMap<ProductId, Money>>().await {
                Ok(prices) => prices,
                Err(err) => {
                    tracing::warn!(%err, "failed to decode inventory service price response");
                    HashMap::new()
                },
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_is_constructed_with_base_url() {
        let client = InventoryPriceClient::new("http://127.0.0.1:8082");
        assert_eq!(client.base_url, "http://127.0.0.1:8082");
    }
}
