//! Cross-service price lookup.
//!
//! The product catalog is owned by exactly one service (inventory); any
//! other service that needs a price snapshot (the order participant, at
//! order-creation time) goes through this trait rather than reaching into
//! the catalog's store directly. In-process callers (tests, a combined
//! deployment) can hand back the catalog itself; a real multi-process
//! deployment hands back an HTTP client against the inventory service.

use crate::ids::ProductId;
use crate::money::Money;
use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;

/// Resolves product ids to their current unit price.
///
/// Dyn-compatible for the same reason as [`crate::event_bus::EventBus`]: it
/// needs to live behind `Arc<dyn PriceSource>` in a reducer `Environment`.
pub trait PriceSource: Send + Sync {
    /// Returns `product_id -> price` for the requested ids. Ids the source
    /// doesn't recognize are simply absent from the result.
    fn prices(
        &self,
        product_ids: &[ProductId],
    ) -> Pin<Box<dyn Future<Output = HashMap<ProductId, Money>> + Send + '_>>;
}
