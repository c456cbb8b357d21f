//! Inventory service: owns the product [`Catalog`](saga_domain::Catalog).
//!
//! Serves two roles at once:
//!
//! - **Choreographed participant**: subscribes to `order.created` and
//!   `saga.revert_inventory` on the shared event bus, drives an
//!   [`InventoryParticipantReducer`] and publishes `inventory.reserved` /
//!   `inventory.reservation_failed` in response.
//! - **Orchestrator peer**: exposes `POST /reserve` and `POST /revert`,
//!   called synchronously by `orchestrator-service`, which never touches the
//!   event bus at all.
//!
//! Both roles share the same underlying [`Catalog`]; this is the one
//! service allowed to mutate it.

pub mod config;
pub mod consumer;
pub mod handlers;
pub mod router;

use saga_domain::Catalog;

pub use config::Config;

/// Shared Axum state: just the catalog. The choreography `Store` runs in a
/// background task and is not reachable from HTTP handlers directly; the
/// orchestrator-facing endpoints mutate the catalog themselves instead of
/// going through the reducer, matching how a synchronous peer call bypasses
/// the asynchronous saga machinery entirely.
///
/// [`Catalog`] is internally `Arc<RwLock<_>>`-backed, so cloning it here and
/// handing a clone to the background participant task shares the same
/// underlying stock, as required.
#[derive(Clone)]
pub struct AppState {
    /// The product catalog, owned exclusively by this service.
    pub catalog: Catalog,
}
