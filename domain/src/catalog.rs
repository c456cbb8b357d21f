//! The product catalog: price and available-stock per product.

use saga_core::pricing::PriceSource;
use saga_core::{Money, ProductId};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use tokio::sync::RwLock;

/// A catalog entry. `available` is the only mutable field; `price` is fixed
/// at catalog-seed time (orders snapshot it, they never re-read it later).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Product {
    /// Catalog identifier.
    pub product_id: ProductId,
    /// Display name.
    pub name: String,
    /// Display description.
    pub description: String,
    /// Unit price.
    pub price: Money,
    /// Units currently in stock. Invariant: never negative.
    pub available: u32,
    /// Product image URL, if any.
    pub image_url: Option<String>,
}

/// Why a batch reservation failed.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ReservationError {
    /// `product_id` didn't have `requested` units available.
    #[error("insufficient stock for {product_id}: requested {requested}, available {available}")]
    InsufficientStock {
        /// The product that ran out.
        product_id: ProductId,
        /// Units requested.
        requested: u32,
        /// Units actually available when the check ran.
        available: u32,
    },
    /// `product_id` is not in the catalog.
    #[error("unknown product {product_id}")]
    UnknownProduct {
        /// The product that could not be found.
        product_id: ProductId,
    },
}

/// The authoritative in-memory product catalog.
///
/// Owned by exactly one service (the inventory participant / service in
/// this demonstrator); every read and write goes through this type, never
/// through a shared map reached into directly by another component.
#[derive(Clone, Default)]
pub struct Catalog {
    products: Arc<RwLock<HashMap<ProductId, Product>>>,
}

impl Catalog {
    /// Builds an empty catalog.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds (or replaces) a catalog entry. Used by service startup/fixtures.
    pub async fn upsert(&self, product: Product) {
        self.products.write().await.insert(product.product_id.clone(), product);
    }

    /// Returns every product in the catalog.
    pub async fn list(&self) -> Vec<Product> {
        self.products.read().await.values().cloned().collect()
    }

    /// Looks up a single product.
    pub async fn get(&self, product_id: &ProductId) -> Option<Product> {
        self.products.read().await.get(product_id).cloned()
    }

    /// Returns `product_id -> price` for the requested ids. Ids not present
    /// in the catalog are simply absent from the result.
    pub async fn prices(&self, product_ids: &[ProductId]) -> HashMap<ProductId, Money> {
        let products = self.products.read().await;
        product_ids
            .iter()
            .filter_map(|id| products.get(id).map(|p| (id.clone(), p.price)))
            .collect()
    }

    /// Atomically reserves `items` (product_id, quantity), returning the
    /// total price. If any item can't be satisfied, every decrement already
    /// applied *within this call* is rolled back before the write lock is
    /// released, and the failure names the first product that ran out.
    ///
    /// # Errors
    ///
    /// Returns [`ReservationError`] if any item is unknown or understocked.
    pub async fn reserve(&self, items: &[(ProductId, u32)]) -> Result<Money, ReservationError> {
        let mut products = self.products.write().await;
        let mut applied: Vec<(ProductId, u32)> = Vec::with_capacity(items.len());
        let mut total = Money::from_cents(0);

        for (product_id, quantity) in items {
            let Some(product) = products.get_mut(product_id) else {
                Self::rollback(&mut products, &applied);
                return Err(ReservationError::UnknownProduct { product_id: product_id.clone() });
            };

            if product.available < *quantity {
                let available = product.available;
                Self::rollback(&mut products, &applied);
                return Err(ReservationError::InsufficientStock {
                    product_id: product_id.clone(),
                    requested: *quantity,
                    available,
                });
            }

            product.available -= quantity;
            total = total + product.price * *quantity;
            applied.push((product_id.clone(), *quantity));
        }

        metrics::histogram!("catalog.reservation.items").record(items.len() as f64);
        Ok(total)
    }

    fn rollback(products: &mut HashMap<ProductId, Product>, applied: &[(ProductId, u32)]) {
        for (product_id, quantity) in applied {
            if let Some(product) = products.get_mut(product_id) {
                product.available += quantity;
            }
        }
    }

    /// Releases a previously reserved batch (the compensating action for
    /// [`Self::reserve`]). Missing products are tolerated: releasing stock
    /// for a product that has since vanished from the catalog is a no-op for
    /// that item, not an error, so duplicate/late-arriving revert events are
    /// safe to replay.
    pub async fn release(&self, items: &[(ProductId, u32)]) {
        let mut products = self.products.write().await;
        for (product_id, quantity) in items {
            if let Some(product) = products.get_mut(product_id) {
                product.available += quantity;
            }
        }
    }
}

impl PriceSource for Catalog {
    fn prices(
        &self,
        product_ids: &[ProductId],
    ) -> Pin<Box<dyn Future<Output = HashMap<ProductId, Money>> + Send + '_>> {
        let product_ids = product_ids.to_vec();
        Box::pin(async move {
            let products = self.products.read().await;
            product_ids
                .iter()
                .filter_map(|id| products.get(id).map(|p| (id.clone(), p.price)))
                .collect()
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn product(id: &str, price_cents: i64, available: u32) -> Product {
        Product {
            product_id: ProductId::new(id),
            name: id.to_string(),
            description: String::new(),
            price: Money::from_cents(price_cents),
            available,
            image_url: None,
        }
    }

    #[tokio::test]
    async fn reserve_decrements_available_and_returns_total() {
        let catalog = Catalog::new();
        catalog.upsert(product("prod-1", 1990, 100)).await;

        let total = catalog.reserve(&[(ProductId::new("prod-1"), 2)]).await.unwrap();

        assert_eq!(total, Money::from_cents(3980));
        assert_eq!(catalog.get(&ProductId::new("prod-1")).await.unwrap().available, 98);
    }

    #[tokio::test]
    async fn reserve_rolls_back_earlier_items_on_later_failure() {
        let catalog = Catalog::new();
        catalog.upsert(product("prod-1", 1000, 5)).await;
        catalog.upsert(product("prod-2", 3450, 1)).await;

        let result = catalog
            .reserve(&[(ProductId::new("prod-1"), 2), (ProductId::new("prod-2"), 2)])
            .await;

        assert!(result.is_err());
        assert_eq!(catalog.get(&ProductId::new("prod-1")).await.unwrap().available, 5);
        assert_eq!(catalog.get(&ProductId::new("prod-2")).await.unwrap().available, 1);
    }

    #[tokio::test]
    async fn release_restores_available_and_tolerates_unknown_products() {
        let catalog = Catalog::new();
        catalog.upsert(product("prod-1", 1000, 8)).await;

        catalog.release(&[(ProductId::new("prod-1"), 2), (ProductId::new("ghost"), 5)]).await;

        assert_eq!(catalog.get(&ProductId::new("prod-1")).await.unwrap().available, 10);
    }
}
