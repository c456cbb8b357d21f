//! The payment participant: charges and refunds against the gateway.

use crate::events::{
    InventoryReservationFailedPayload, InventoryReservedPayload, OrderOutcomePayload,
    PaymentFailedPayload, PaymentProcessedPayload, RevertInventoryPayload, RevertPaymentPayload,
    ORDER_APPROVED, ORDER_REJECTED, PAYMENT_FAILED, PAYMENT_PROCESSED, REVERT_INVENTORY,
};
use chrono::Utc;
use saga_core::{CustomerId, Effect, EventBus, Envelope, OrderId, Reducer};
use saga_payment::PaymentGateway;
use std::sync::Arc;

/// Events the payment participant reacts to.
#[derive(Clone, Debug)]
pub enum PaymentAction {
    /// Subscribed `InventoryReserved`: charge the customer for the order total.
    RemoteInventoryReserved {
        /// The reserved order.
        order_id: OrderId,
        /// The decoded `InventoryReserved` payload.
        payload: InventoryReservedPayload,
    },
    /// Subscribed `InventoryReservationFailed`: the saga fails before any charge.
    RemoteInventoryReservationFailed {
        /// The order that failed reservation.
        order_id: OrderId,
        /// The decoded `InventoryReservationFailed` payload.
        payload: InventoryReservationFailedPayload,
    },
    /// Subscribed `RevertPayment`: refund a previously completed charge.
    RemoteRevertPayment {
        /// The order whose charge should be refunded.
        order_id: OrderId,
        /// The decoded `RevertPayment` payload.
        payload: RevertPaymentPayload,
    },
}

/// Dependencies injected into the payment participant.
#[derive(Clone)]
pub struct PaymentParticipantEnvironment {
    /// The payment gateway this service owns the transaction map for.
    pub gateway: PaymentGateway,
    /// The bus `PaymentProcessed` / `PaymentFailed` / `OrderApproved` /
    /// `OrderRejected` / `RevertInventory` are published on.
    pub event_bus: Arc<dyn EventBus>,
}

/// Marker state: the real state lives in [`PaymentParticipantEnvironment::gateway`].
#[derive(Clone, Debug, Default)]
pub struct PaymentParticipantState;

/// Reducer for the payment participant.
#[derive(Clone, Default)]
pub struct PaymentParticipantReducer;

impl Reducer for PaymentParticipantReducer {
    type State = PaymentParticipantState;
    type Action = PaymentAction;
    type Environment = PaymentParticipantEnvironment;

    fn reduce(
        &self,
        _state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> Vec<Effect<Self::Action>> {
        match action {
            PaymentAction::RemoteInventoryReserved { order_id, payload } => {
                let gateway = env.gateway.clone();
                let event_bus = Arc::clone(&env.event_bus);
                vec![Effect::Future(Box::pin(async move {
                    process_payment(gateway, event_bus, order_id, payload).await;
                    None
                }))]
            },
            PaymentAction::RemoteInventoryReservationFailed { order_id, payload } => {
                let event_bus = Arc::clone(&env.event_bus);
                vec![Effect::Future(Box::pin(async move {
                    let outcome = OrderOutcomePayload { customer_id: payload.customer_id, reason: Some(payload.reason) };
                    publish(&event_bus, &order_id, ORDER_REJECTED, &outcome).await;
                    None
                }))]
            },
            PaymentAction::RemoteRevertPayment { order_id, payload } => {
                let gateway = env.gateway.clone();
                vec![Effect::Future(Box::pin(async move {
                    if let Err(err) = gateway.refund(&order_id).await {
                        tracing::warn!(%err, %order_id, "refund declined during compensation");
                    }
                    tracing::debug!(%order_id, reason = %payload.reason, "processed RevertPayment");
                    None
                }))]
            },
        }
    }
}

async fn process_payment(
    gateway: PaymentGateway,
    event_bus: Arc<dyn EventBus>,
    order_id: OrderId,
    payload: InventoryReservedPayload,
) {
    let InventoryReservedPayload { customer_id, items, total } = payload;
    match gateway.charge(&order_id, &customer_id, total).await {
        Ok(()) => {
            let processed = PaymentProcessedPayload { customer_id: customer_id.clone(), total };
            publish(&event_bus, &order_id, PAYMENT_PROCESSED, &processed).await;

            let approved = OrderOutcomePayload { customer_id, reason: None };
            publish(&event_bus, &order_id, ORDER_APPROVED, &approved).await;
            metrics::counter!("payment.saga_charge.approved").increment(1);
        },
        Err(err) => {
            let reason = err.to_string();

            let failed = PaymentFailedPayload { customer_id: customer_id.clone(), items: items.clone(), reason: reason.clone() };
            publish(&event_bus, &order_id, PAYMENT_FAILED, &failed).await;

            let revert = RevertInventoryPayload { customer_id: customer_id.clone(), items, reason: reason.clone() };
            publish(&event_bus, &order_id, REVERT_INVENTORY, &revert).await;

            let rejected = OrderOutcomePayload { customer_id, reason: Some(reason) };
            publish(&event_bus, &order_id, ORDER_REJECTED, &rejected).await;
            metrics::counter!("payment.saga_charge.rejected").increment(1);
        },
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
    use saga_core::{Money, ProductId};
    use saga_domain::OrderItem;
    use saga_testing::mocks::InMemoryEventBus;

    fn reserved_payload() -> InventoryReservedPayload {
        InventoryReservedPayload {
            customer_id: CustomerId::new("cust-1"),
            items: vec![OrderItem { product_id: ProductId::new("prod-1"), quantity: 1, price: Money::from_cents(1990) }],
            total: Money::from_cents(1990),
        }
    }

    #[tokio::test]
    async fn successful_charge_publishes_processed_and_approved() {
        let gateway = PaymentGateway::new(Money::from_cents(200_000), 0.0);
        let bus: Arc<dyn EventBus> = Arc::new(InMemoryEventBus::new());
        let mut processed = bus.subscribe(PAYMENT_PROCESSED).await.unwrap();
        let mut approved = bus.subscribe(ORDER_APPROVED).await.unwrap();

        process_payment(gateway, Arc::clone(&bus), OrderId::new("ord-1"), reserved_payload()).await;

        assert_eq!(processed.next().await.unwrap().unwrap().event_type, PAYMENT_PROCESSED);
        assert_eq!(approved.next().await.unwrap().unwrap().event_type, ORDER_APPROVED);
    }

    #[tokio::test]
    async fn declined_charge_triggers_revert_inventory_and_rejects_order() {
        let gateway = PaymentGateway::new(Money::from_cents(0), 0.0);
        let bus: Arc<dyn EventBus> = Arc::new(InMemoryEventBus::new());
        let mut failed = bus.subscribe(PAYMENT_FAILED).await.unwrap();
        let mut revert = bus.subscribe(REVERT_INVENTORY).await.unwrap();
        let mut rejected = bus.subscribe(ORDER_REJECTED).await.unwrap();

        process_payment(gateway, Arc::clone(&bus), OrderId::new("ord-1"), reserved_payload()).await;

        assert_eq!(failed.next().await.unwrap().unwrap().event_type, PAYMENT_FAILED);
        assert_eq!(revert.next().await.unwrap().unwrap().event_type, REVERT_INVENTORY);
        assert_eq!(rejected.next().await.unwrap().unwrap().event_type, ORDER_REJECTED);
    }
}
