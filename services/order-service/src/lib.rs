//! Order service: owns the [`OrderStore`](saga_domain::OrderStore) and
//! mints new orders.
//!
//! Unlike inventory and payment, this service's HTTP surface doubles as
//! both the client-facing API (`POST /create_order`, `GET /orders`,
//! `GET /orders/{id}`) *and* the orchestrator's peer call for the same
//! `create_order` operation; there is no separate orchestrator-only
//! variant of it, only a `POST /confirm` addition the orchestrated flow
//! alone drives.
//!
//! Choreographed participant role: subscribes to `OrderApproved` /
//! `OrderRejected` to move a pending order to its terminal status.

pub mod config;
pub mod consumer;
pub mod handlers;
pub mod price_client;
pub mod router;

use saga_choreography::{OrderParticipantEnvironment, OrderParticipantReducer, OrderParticipantState};
use saga_runtime::Store;

pub use config::Config;

/// The order participant's store, shared between HTTP handlers (which send
/// `CreateOrder`/observe feedback) and the background consumer (which sends
/// `RemoteOrderApproved`/`RemoteOrderRejected`).
pub type OrderParticipantStore =
    Store<OrderParticipantState, saga_choreography::OrderAction, OrderParticipantEnvironment, OrderParticipantReducer>;

use saga_domain::OrderStore;
use std::time::Duration;

/// Shared Axum state.
#[derive(Clone)]
pub struct AppState {
    /// The order participant's store.
    pub store: OrderParticipantStore,
    /// Direct read access to the order store, for `GET /orders*` (these
    /// reads don't need to go through the reducer).
    pub order_store: OrderStore,
    /// How long `POST /create_order` waits for feedback before timing out.
    pub create_order_timeout: Duration,
}
