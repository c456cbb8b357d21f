//! Background tasks that turn bus events into [`InventoryAction`]s.

use futures::StreamExt;
use saga_choreography::events::{
    OrderCreatedPayload, RevertInventoryPayload, ORDER_CREATED, REVERT_INVENTORY,
};
use saga_choreography::{
    InventoryAction, InventoryParticipantEnvironment, InventoryParticipantReducer,
};
use saga_core::{EventBus, OrderId};
use saga_runtime::Store;
use std::sync::Arc;

type InventoryStore = Store<
    saga_choreography::InventoryParticipantState,
    InventoryAction,
    InventoryParticipantEnvironment,
    InventoryParticipantReducer,
>;

/// Subscribes to `OrderCreated` and `RevertInventory`, feeding both into the
/// inventory participant store. Each subscription runs on its own task so a
/// slow handler for one event type never backs up the other's queue.
pub fn spawn(store: InventoryStore, event_bus: Arc<dyn EventBus>) {
    tokio::spawn(consume_order_created(store.clone(), Arc::clone(&event_bus)));
    tokio::spawn(consume_revert_inventory(store, event_bus));
}

async fn consume_order_created(store: InventoryStore, event_bus: Arc<dyn EventBus>) {
    let mut stream = match event_bus.subscribe(ORDER_CREATED).await {
        Ok(stream) => stream,
        Err(err) => {
            tracing::error!(%err, "failed to subscribe to OrderCreated");
            return;
        },
    };

    while let Some(result) = stream.next().await {
        let envelope = match result {
            Ok(envelope) => envelope,
            Err(err) => {
                tracing::warn!(%err, "OrderCreated delivery error");
                continue;
            },
        };
        match envelope.decode::<OrderCreatedPayload>() {
            Ok(payload) => {
                let action = InventoryAction::RemoteOrderCreated {
                    order_id: OrderId::new(envelope.order_id.clone()),
                    customer_id: payload.customer_id.clone(),
                    payload,
                };
                store.send(action).await;
            },
            Err(err) => tracing::warn!(%err, order_id = %envelope.order_id, "failed to decode OrderCreated"),
        }
    }
}

async fn consume_revert_inventory(store: InventoryStore, event_bus: Arc<dyn EventBus>) {
    let mut stream = match event_bus.subscribe(REVERT_INVENTORY).await {
        Ok(stream) => stream,
        Err(err) => {
            tracing::error!(%err, "failed to subscribe to RevertInventory");
            return;
        },
    };

    while let Some(result) = stream.next().await {
        let envelope = match result {
            Ok(envelope) => envelope,
            Err(err) => {
                tracing::warn!(%err, "RevertInventory delivery error");
                continue;
            },
        };
        match envelope.decode::<RevertInventoryPayload>() {
            Ok(payload) => {
                let action = InventoryAction::RemoteRevertInventory {
                    order_id: OrderId::new(envelope.order_id.clone()),
                    payload,
                };
                store.send(action).await;
            },
            Err(err) => tracing::warn!(%err, order_id = %envelope.order_id, "failed to decode RevertInventory"),
        }
    }
}
