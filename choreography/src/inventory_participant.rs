//! The inventory participant: reserves and releases stock.

use crate::events::{
    quantities, InventoryReservedPayload, InventoryReservationFailedPayload, OrderCreatedPayload,
    RevertInventoryPayload, INVENTORY_RESERVATION_FAILED, INVENTORY_RESERVED,
};
use chrono::Utc;
use saga_core::{CustomerId, Effect, EventBus, Envelope, OrderId, ProductId, Reducer};
use saga_domain::{Catalog, ReservationError};
use std::sync::Arc;

/// Events the inventory participant reacts to.
#[derive(Clone, Debug)]
pub enum InventoryAction {
    /// Subscribed `OrderCreated`: reserve stock for every line item.
    RemoteOrderCreated {
        /// The order to reserve stock for.
        order_id: OrderId,
        /// The order's customer.
        customer_id: CustomerId,
        /// The decoded `OrderCreated` payload.
        payload: OrderCreatedPayload,
    },
    /// Subscribed `RevertInventory`: release previously reserved stock.
    RemoteRevertInventory {
        /// The order whose stock should be released.
        order_id: OrderId,
        /// The decoded `RevertInventory` payload.
        payload: RevertInventoryPayload,
    },
}

/// Dependencies injected into the inventory participant.
#[derive(Clone)]
pub struct InventoryParticipantEnvironment {
    /// The authoritative product catalog this service owns.
    pub catalog: Catalog,
    /// The bus `InventoryReserved` / `InventoryReservationFailed` are published on.
    pub event_bus: Arc<dyn EventBus>,
}

/// Marker state: the real state lives in [`InventoryParticipantEnvironment::catalog`].
#[derive(Clone, Debug, Default)]
pub struct InventoryParticipantState;

/// Reducer for the inventory participant.
#[derive(Clone, Default)]
pub struct InventoryParticipantReducer;

impl Reducer for InventoryParticipantReducer {
    type State = InventoryParticipantState;
    type Action = InventoryAction;
    type Environment = InventoryParticipantEnvironment;

    fn reduce(
        &self,
        _state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> Vec<Effect<Self::Action>> {
        match action {
            InventoryAction::RemoteOrderCreated { order_id, customer_id, payload } => {
                let catalog = env.catalog.clone();
                let event_bus = Arc::clone(&env.event_bus);
                vec![Effect::Future(Box::pin(async move {
                    reserve(catalog, event_bus, order_id, customer_id, payload).await;
                    None
                }))]
            },
            InventoryAction::RemoteRevertInventory { order_id, payload } => {
                let catalog = env.catalog.clone();
                vec![Effect::Future(Box::pin(async move {
                    catalog.release(&quantities(&payload.items)).await;
                    tracing::debug!(%order_id, reason = %payload.reason, "reverted inventory reservation");
                    None
                }))]
            },
        }
    }
}

async fn reserve(
    catalog: Catalog,
    event_bus: Arc<dyn EventBus>,
    order_id: OrderId,
    customer_id: CustomerId,
    payload: OrderCreatedPayload,
) {
    match catalog.reserve(&quantities(&payload.items)).await {
        Ok(_recomputed_total) => {
            let reserved = InventoryReservedPayload {
                customer_id,
                items: payload.items,
                // The order's total, fixed at creation time, is reused for
                // the rest of the saga rather than the catalog's own figure.
                total: payload.total,
            };
            publish(&event_bus, &order_id, INVENTORY_RESERVED, &reserved).await;
            metrics::counter!("inventory.reserved.total").increment(1);
        },
        Err(err) => {
            let product_id = failing_product(&err);
            let failed = InventoryReservationFailedPayload {
                customer_id,
                product_id,
                reason: err.to_string(),
            };
            publish(&event_bus, &order_id, INVENTORY_RESERVATION_FAILED, &failed).await;
            metrics::counter!("inventory.reservation_failed.total").increment(1);
        },
    }
}

fn failing_product(err: &ReservationError) -> ProductId {
    match err {
        ReservationError::InsufficientStock { product_id, .. }
        | ReservationError::UnknownProduct { product_id } => product_id.clone(),
    }
}

async fn publish<T: serde::Serialize>(
    event_bus: &Arc<dyn EventBus>,
    order_id: &OrderId,
    event_type: &str,
    payload: &T,
) {
    match Envelope::new(order_id.to_string(), Utc::now(), event_type, None, payload) {
        Ok(envelope) => {
            if let Err(err) = event_bus.publish(envelope).await {
                tracing::warn!(%err, %order_id, event_type, "failed to publish event");
            }
        },
        Err(err) => {
            tracing::warn!(%err, %order_id, event_type, "failed to encode event payload");
        },
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use futures::StreamExt;
    use saga_core::Money;
    use saga_domain::catalog::Product;
    use saga_domain::OrderItem;
    use saga_testing::mocks::InMemoryEventBus;

    fn product(id: &str, available: u32) -> Product {
        Product {
            product_id: ProductId::new(id),
            name: id.to_string(),
            description: String::new(),
            price: Money::from_cents(1990),
            available,
            image_url: None,
        }
    }

    #[tokio::test]
    async fn reserve_publishes_inventory_reserved_on_success() {
        let catalog = Catalog::new();
        catalog.upsert(product("prod-1", 10)).await;
        let bus: Arc<dyn EventBus> = Arc::new(InMemoryEventBus::new());
        let mut reserved_stream = bus.subscribe(INVENTORY_RESERVED).await.unwrap();

        let payload = OrderCreatedPayload {
            customer_id: CustomerId::new("cust-1"),
            items: vec![OrderItem { product_id: ProductId::new("prod-1"), quantity: 2, price: Money::from_cents(1990) }],
            total: Money::from_cents(3980),
        };
        reserve(catalog.clone(), Arc::clone(&bus), OrderId::new("ord-1"), CustomerId::new("cust-1"), payload).await;

        assert_eq!(catalog.get(&ProductId::new("prod-1")).await.unwrap().available, 8);
        let envelope = reserved_stream.next().await.unwrap().unwrap();
        assert_eq!(envelope.event_type, INVENTORY_RESERVED);
    }

    #[tokio::test]
    async fn reserve_publishes_reservation_failed_on_insufficient_stock() {
        let catalog = Catalog::new();
        catalog.upsert(product("prod-1", 1)).await;
        let bus: Arc<dyn EventBus> = Arc::new(InMemoryEventBus::new());
        let mut failed_stream = bus.subscribe(INVENTORY_RESERVATION_FAILED).await.unwrap();

        let payload = OrderCreatedPayload {
            customer_id: CustomerId::new("cust-1"),
            items: vec![OrderItem { product_id: ProductId::new("prod-1"), quantity: 2, price: Money::from_cents(1990) }],
            total: Money::from_cents(3980),
        };
        reserve(catalog.clone(), Arc::clone(&bus), OrderId::new("ord-1"), CustomerId::new("cust-1"), payload).await;

        assert_eq!(catalog.get(&ProductId::new("prod-1")).await.unwrap().available, 1);
        let envelope = failed_stream.next().await.unwrap().unwrap();
        assert_eq!(envelope.event_type, INVENTORY_RESERVATION_FAILED);
    }
}
