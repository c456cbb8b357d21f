//! The order store: order lifecycle from `pending` to a terminal status.

use saga_core::{CustomerId, Money, OrderId, ProductId};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;

/// A line item on an order: the product, the quantity, and the unit price
/// snapshotted at order-creation time (never re-read from the catalog
/// afterward, so a later price change can't retroactively alter a placed
/// order's total).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct OrderItem {
    /// The product ordered.
    pub product_id: ProductId,
    /// Units ordered. Always greater than zero.
    pub quantity: u32,
    /// Unit price at order-creation time.
    pub price: Money,
}

/// Terminal outcome of an order. Once `Approved` or `Rejected`, the status
/// never changes again.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    /// The order has been created but the saga hasn't finished.
    Pending,
    /// Every step succeeded.
    Approved,
    /// Some step failed and the saga unwound.
    Rejected,
}

/// A business transaction: a customer's request for some line items.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Order {
    /// Monotonic, time-derived identifier.
    pub order_id: OrderId,
    /// Who placed the order.
    pub customer_id: CustomerId,
    /// Line items, priced at creation time.
    pub items: Vec<OrderItem>,
    /// Current lifecycle status.
    pub status: OrderStatus,
    /// Sum of `item.price * item.quantity` across `items`.
    pub total: Money,
    /// Set when `status` becomes `Rejected` (or occasionally alongside `Approved`
    /// for diagnostic purposes).
    pub reason: Option<String>,
}

/// Generates order ids that sort in creation order, even for orders created
/// within the same nanosecond: a timestamp component plus a process-local
/// sequence number disambiguates ties.
#[must_use]
pub fn next_order_id(now: chrono::DateTime<chrono::Utc>) -> OrderId {
    static SEQUENCE: AtomicU64 = AtomicU64::new(0);
    let sequence = SEQUENCE.fetch_add(1, Ordering::Relaxed);
    OrderId::new(format!("ord-{}-{sequence:06}", now.timestamp_nanos_opt().unwrap_or_default()))
}

/// The authoritative in-memory order store, owned by the order participant
/// / order service.
#[derive(Clone, Default)]
pub struct OrderStore {
    orders: Arc<RwLock<HashMap<OrderId, Order>>>,
}

impl OrderStore {
    /// Builds an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a freshly created `pending` order.
    pub async fn create(&self, order: Order) {
        self.orders.write().await.insert(order.order_id.clone(), order);
    }

    /// Looks up a single order.
    pub async fn get(&self, order_id: &OrderId) -> Option<Order> {
        self.orders.read().await.get(order_id).cloned()
    }

    /// Lists every order placed by `customer_id`.
    pub async fn list_by_customer(&self, customer_id: &CustomerId) -> Vec<Order> {
        self.orders
            .read()
            .await
            .values()
            .filter(|order| &order.customer_id == customer_id)
            .cloned()
            .collect()
    }

    /// Moves `order_id` to a terminal status.
    ///
    /// Idempotent and duplicate-delivery-safe: if the order is already
    /// terminal, this is a no-op (status is immutable once set). If the
    /// order is unknown (the status event arrived before, or instead of,
    /// the creation event), a placeholder record is created so that later
    /// lookups by this id still resolve, per the choreographed order
    /// participant's contract.
    pub async fn set_status(
        &self,
        order_id: &OrderId,
        customer_id: &CustomerId,
        status: OrderStatus,
        reason: Option<String>,
    ) {
        let mut orders = self.orders.write().await;
        match orders.get_mut(order_id) {
            Some(order) if order.status == OrderStatus::Pending => {
                order.status = status;
                order.reason = reason;
            },
            Some(_) => {
                tracing::debug!(%order_id, "ignoring status transition: order already terminal");
            },
            None => {
                tracing::debug!(%order_id, "order unknown, creating placeholder record");
                orders.insert(
                    order_id.clone(),
                    Order {
                        order_id: order_id.clone(),
                        customer_id: customer_id.clone(),
                        items: Vec::new(),
                        status,
                        total: Money::from_cents(0),
                        reason,
                    },
                );
            },
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn sample_order(order_id: OrderId) -> Order {
        Order {
            order_id,
            customer_id: CustomerId::new("cust-1"),
            items: vec![OrderItem { product_id: ProductId::new("prod-1"), quantity: 2, price: Money::from_cents(1990) }],
            status: OrderStatus::Pending,
            total: Money::from_cents(3980),
            reason: None,
        }
    }

    #[tokio::test]
    async fn set_status_transitions_pending_order_to_terminal() {
        let store = OrderStore::new();
        let order_id = OrderId::new("ord-1");
        store.create(sample_order(order_id.clone())).await;

        store.set_status(&order_id, &CustomerId::new("cust-1"), OrderStatus::Approved, None).await;

        let order = store.get(&order_id).await.unwrap();
        assert_eq!(order.status, OrderStatus::Approved);
    }

    #[tokio::test]
    async fn set_status_is_immutable_once_terminal() {
        let store = OrderStore::new();
        let order_id = OrderId::new("ord-1");
        store.create(sample_order(order_id.clone())).await;

        store.set_status(&order_id, &CustomerId::new("cust-1"), OrderStatus::Approved, None).await;
        store
            .set_status(&order_id, &CustomerId::new("cust-1"), OrderStatus::Rejected, Some("late".into()))
            .await;

        let order = store.get(&order_id).await.unwrap();
        assert_eq!(order.status, OrderStatus::Approved);
        assert_eq!(order.reason, None);
    }

    #[tokio::test]
    async fn set_status_creates_placeholder_for_unknown_order() {
        let store = OrderStore::new();
        let order_id = OrderId::new("ord-unknown");

        store
            .set_status(&order_id, &CustomerId::new("cust-2"), OrderStatus::Rejected, Some("no stock".into()))
            .await;

        let order = store.get(&order_id).await.unwrap();
        assert_eq!(order.status, OrderStatus::Rejected);
    }

    #[test]
    fn next_order_id_is_unique_within_same_instant() {
        let now = chrono::Utc::now();
        let a = next_order_id(now);
        let b = next_order_id(now);
        assert_ne!(a, b);
    }
}
