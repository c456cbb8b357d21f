//! The order participant: accepts new orders, reacts to terminal outcomes.

use crate::events::{OrderCreatedPayload, ORDER_CREATED};
use chrono::Utc;
use saga_core::pricing::PriceSource;
use saga_core::{Clock, CustomerId, Effect, EventBus, Envelope, Money, OrderId, ProductId, Reducer};
use saga_domain::order::next_order_id;
use saga_domain::{Order, OrderItem, OrderStatus, OrderStore};
use std::sync::Arc;

/// Commands and remote-event feedback the order participant handles.
#[derive(Clone, Debug)]
pub enum OrderAction {
    /// Create a new order for `customer_id` with the given line items.
    CreateOrder {
        /// The ordering customer.
        customer_id: CustomerId,
        /// `(product_id, quantity)` pairs as requested by the caller.
        items: Vec<(ProductId, u32)>,
    },
    /// Feedback: the order was created and `OrderCreated` published.
    OrderAccepted {
        /// The newly minted order id.
        order_id: OrderId,
        /// A human-readable acknowledgement.
        message: String,
    },
    /// Feedback: `CreateOrder` could not be completed.
    CreateOrderFailed {
        /// Why creation failed.
        reason: String,
    },
    /// The saga approved `order_id` (derived from a subscribed `OrderApproved` event).
    RemoteOrderApproved {
        /// The order that was approved.
        order_id: OrderId,
        /// The customer who placed it.
        customer_id: CustomerId,
    },
    /// The saga rejected `order_id` (derived from a subscribed `OrderRejected` event).
    RemoteOrderRejected {
        /// The order that was rejected.
        order_id: OrderId,
        /// The customer who placed it.
        customer_id: CustomerId,
        /// Why it was rejected.
        reason: String,
    },
}

/// Dependencies injected into the order participant.
#[derive(Clone)]
pub struct OrderParticipantEnvironment {
    /// The authoritative order store this service owns.
    pub order_store: OrderStore,
    /// Resolves price snapshots at order-creation time. The catalog is owned
    /// by the inventory service, so this is an `Arc<dyn PriceSource>` rather
    /// than a direct handle to its store (an in-process `Catalog` when
    /// everything runs in one binary, an HTTP client otherwise).
    pub price_source: Arc<dyn PriceSource>,
    /// The bus `OrderCreated` is published on.
    pub event_bus: Arc<dyn EventBus>,
    /// Clock used to mint time-ordered order ids.
    pub clock: Arc<dyn Clock>,
}

/// Marker state: the real state lives in [`OrderParticipantEnvironment::order_store`].
#[derive(Clone, Debug, Default)]
pub struct OrderParticipantState;

/// Reducer for the order participant.
#[derive(Clone, Default)]
pub struct OrderParticipantReducer;

impl Reducer for OrderParticipantReducer {
    type State = OrderParticipantState;
    type Action = OrderAction;
    type Environment = OrderParticipantEnvironment;

    fn reduce(
        &self,
        _state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> Vec<Effect<Self::Action>> {
        match action {
            OrderAction::CreateOrder { customer_id, items } => {
                let order_store = env.order_store.clone();
                let price_source = Arc::clone(&env.price_source);
                let event_bus = Arc::clone(&env.event_bus);
                let clock = Arc::clone(&env.clock);
                vec![Effect::Future(Box::pin(async move {
                    Some(create_order(order_store, price_source, event_bus, clock, customer_id, items).await)
                }))]
            },
            OrderAction::OrderAccepted { .. } | OrderAction::CreateOrderFailed { .. } => {
                vec![Effect::None]
            },
            OrderAction::RemoteOrderApproved { order_id, customer_id } => {
                let order_store = env.order_store.clone();
                vec![Effect::Future(Box::pin(async move {
                    order_store.set_status(&order_id, &customer_id, OrderStatus::Approved, None).await;
                    None
                }))]
            },
            OrderAction::RemoteOrderRejected { order_id, customer_id, reason } => {
                let order_store = env.order_store.clone();
                vec![Effect::Future(Box::pin(async move {
                    order_store.set_status(&order_id, &customer_id, OrderStatus::Rejected, Some(reason)).await;
                    None
                }))]
            },
        }
    }
}

async fn create_order(
    order_store: OrderStore,
    price_source: Arc<dyn PriceSource>,
    event_bus: Arc<dyn EventBus>,
    clock: Arc<dyn Clock>,
    customer_id: CustomerId,
    items: Vec<(ProductId, u32)>,
) -> OrderAction {
    if items.is_empty() {
        return OrderAction::CreateOrderFailed { reason: "order must have at least one item".into() };
    }

    let product_ids: Vec<ProductId> = items.iter().map(|(id, _)| id.clone()).collect();
    let prices = price_source.prices(&product_ids).await;

    let mut order_items = Vec::with_capacity(items.len());
    for (product_id, quantity) in &items {
        let Some(price) = prices.get(product_id).copied() else {
            return OrderAction::CreateOrderFailed { reason: format!("unknown product {product_id}") };
        };
        order_items.push(OrderItem { product_id: product_id.clone(), quantity: *quantity, price });
    }

    let total = order_items.iter().fold(Money::from_cents(0), |acc, item| acc + item.price * item.quantity);
    let order_id = next_order_id(clock.now());

    order_store
        .create(Order {
            order_id: order_id.clone(),
            customer_id: customer_id.clone(),
            items: order_items.clone(),
            status: OrderStatus::Pending,
            total,
            reason: None,
        })
        .await;

    let payload = OrderCreatedPayload { customer_id, items: order_items, total };
    match Envelope::new(order_id.to_string(), Utc::now(), ORDER_CREATED, None, &payload) {
        Ok(envelope) => {
            if let Err(err) = event_bus.publish(envelope).await {
                tracing::warn!(%err, %order_id, "failed to publish OrderCreated");
            }
        },
        Err(err) => {
            tracing::warn!(%err, %order_id, "failed to encode OrderCreated payload");
        },
    }

    metrics::counter!("order.created.total").increment(1);
    OrderAction::OrderAccepted { order_id, message: "order accepted".to_string() }
}
