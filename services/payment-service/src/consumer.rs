//! Background tasks that turn bus events into [`PaymentAction`]s.

use futures::StreamExt;
use saga_choreography::events::{
    InventoryReservationFailedPayload, InventoryReservedPayload, RevertPaymentPayload,
    INVENTORY_RESERVATION_FAILED, INVENTORY_RESERVED, REVERT_PAYMENT,
};
use saga_choreography::{PaymentAction, PaymentParticipantEnvironment, PaymentParticipantReducer};
use saga_core::{EventBus, OrderId};
use saga_runtime::Store;
use std::sync::Arc;

type PaymentStore = Store<
    saga_choreography::PaymentParticipantState,
    PaymentAction,
    PaymentParticipantEnvironment,
    PaymentParticipantReducer,
>;

/// Subscribes to `InventoryReserved`, `InventoryReservationFailed`, and
/// `RevertPayment`, feeding each into the payment participant store.
pub fn spawn(store: PaymentStore, event_bus: Arc<dyn EventBus>) {
    tokio::spawn(consume_inventory_reserved(store.clone(), Arc::clone(&event_bus)));
    tokio::spawn(consume_inventory_reservation_failed(store.clone(), Arc::clone(&event_bus)));
    tokio::spawn(consume_revert_payment(store, event_bus));
}

async fn consume_inventory_reserved(store: PaymentStore, event_bus: Arc<dyn EventBus>) {
    let mut stream = match event_bus.subscribe(INVENTORY_RESERVED).await {
        Ok(stream) => stream,
        Err(err) => {
            tracing::error!(%err, "failed to subscribe to InventoryReserved");
            return;
        },
    };

    while let Some(result) = stream.next().await {
        let envelope = match result {
            Ok(envelope) => envelope,
            Err(err) => {
                tracing::warn!(%err, "InventoryReserved delivery error");
                continue;
            },
        };
        match envelope.decode::<InventoryReservedPayload>() {
            Ok(payload) => {
                let action =
                    PaymentAction::RemoteInventoryReserved { order_id: OrderId::new(envelope.order_id.clone()), payload };
                store.send(action).await;
            },
            Err(err) => tracing::warn!(%err, order_id = %envelope.order_id, "failed to decode InventoryReserved"),
        }
    }
}

async fn consume_inventory_reservation_failed(store: PaymentStore, event_bus: Arc<dyn EventBus>) {
    let mut stream = match event_bus.subscribe(INVENTORY_RESERVATION_FAILED).await {
        Ok(stream) => stream,
        Err(err) => {
            tracing::error!(%err, "failed to subscribe to InventoryReservationFailed");
            return;
        },
    };

    while let Some(result) = stream.next().await {
        let envelope = match result {
            Ok(envelope) => envelope,
            Err(err) => {
                tracing::warn!(%err, "InventoryReservationFailed delivery error");
                continue;
            },
        };
        match envelope.decode::<InventoryReservationFailedPayload>() {
            Ok(payload) => {
                let action = PaymentAction::RemoteInventoryReservationFailed {
                    order_id: OrderId::new(envelope.order_id.clone()),
                    payload,
                };
                store.send(action).await;
            },
            Err(err) => {
                tracing::warn!(%err, order_id = %envelope.order_id, "failed to decode InventoryReservationFailed");
            },
        }
    }
}

async fn consume_revert_payment(store: PaymentStore, event_bus: Arc<dyn EventBus>) {
    let mut stream = match event_bus.subscribe(REVERT_PAYMENT).await {
        Ok(stream) => stream,
        Err(err) => {
            tracing::error!(%err, "failed to subscribe to RevertPayment");
            return;
        },
    };

    while let Some(result) = stream.next().await {
        let envelope = match result {
            Ok(envelope) => envelope,
            Err(err) => {
                tracing::warn!(%err, "RevertPayment delivery error");
                continue;
            },
        };
        match envelope.decode::<RevertPaymentPayload>() {
            Ok(payload) => {
                let action =
                    PaymentAction::RemoteRevertPayment { order_id: OrderId::new(envelope.order_id.clone()), payload };
                store.send(action).await;
            },
            Err(err) => tracing::warn!(%err, order_id = %envelope.order_id, "failed to decode RevertPayment"),
        }
    }
}
