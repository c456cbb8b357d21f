//! Background tasks that turn bus events into [`OrderAction`]s.

use crate::OrderParticipantStore;
use futures::StreamExt;
use saga_choreography::events::{OrderOutcomePayload, ORDER_APPROVED, ORDER_REJECTED};
use saga_choreography::OrderAction;
use saga_core::{EventBus, OrderId};
use std::sync::Arc;

/// Subscribes to `OrderApproved` and `OrderRejected`, feeding each into the
/// order participant store.
pub fn spawn(store: OrderParticipantStore, event_bus: Arc<dyn EventBus>) {
    tokio::spawn(consume_order_approved(store.clone(), Arc::clone(&event_bus)));
    tokio::spawn(consume_order_rejected(store, event_bus));
}

async fn consume_order_approved(store: OrderParticipantStore, event_bus: Arc<dyn EventBus>) {
    let mut stream = match event_bus.subscribe(ORDER_APPROVED).await {
        Ok(stream) => stream,
        Err(err) => {
            tracing::error!(%err, "failed to subscribe to OrderApproved");
            return;
        },
    };

    while let Some(result) = stream.next().await {
        let envelope = match result {
            Ok(envelope) => envelope,
            Err(err) => {
                tracing::warn!(%err, "OrderApproved delivery error");
                continue;
            },
        };
        match envelope.decode::<OrderOutcomePayload>() {
            Ok(payload) => {
                let action = OrderAction::RemoteOrderApproved {
                    order_id: OrderId::new(envelope.order_id.clone()),
                    customer_id: payload.customer_id,
                };
                store.send(action).await;
            },
            Err(err) => tracing::warn!(%err, order_id = %envelope.order_id, "failed to decode OrderApproved"),
        }
    }
}

async fn consume_order_rejected(store: OrderParticipantStore, event_bus: Arc<dyn EventBus>) {
    let mut stream = match event_bus.subscribe(ORDER_REJECTED).await {
        Ok(stream) => stream,
        Err(err) => {
            tracing::error!(%err, "failed to subscribe to OrderRejected");
            return;
        },
    };

    while let Some(result) = stream.next().await {
        let envelope = match result {
            Ok(envelope) => envelope,
            Err(err) => {
                tracing::warn!(%err, "OrderRejected delivery error");
                continue;
            },
        };
        match envelope.decode::<OrderOutcomePayload>() {
            Ok(payload) => {
                let action = OrderAction::RemoteOrderRejected {
                    order_id: OrderId::new(envelope.order_id.clone()),
                    customer_id: payload.customer_id,
                    reason: payload.reason.unwrap_or_else(|| "unspecified".to_string()),
                };
                store.send(action).await;
            },
            Err(err) => tracing::warn!(%err, order_id = %envelope.order_id, "failed to decode OrderRejected"),
        }
    }
}
