//! Orchestrator service: sequences the order/inventory/payment steps from a
//! single coordinator over HTTP, rather than letting each service react to
//! events on its own.
//!
//! This binary owns no domain store of its own; it only holds a
//! [`SagaCoordinator`](saga_orchestrator::SagaCoordinator) wired against the
//! other three services' HTTP surfaces, so it has no event-bus connection
//! and no reducer either.

pub mod config;
pub mod handlers;
pub mod router;

use saga_orchestrator::SagaCoordinator;

pub use config::Config;

/// Shared Axum state.
#[derive(Clone)]
pub struct AppState {
    /// Drives each saga from `CreateOrder` through `ConfirmOrder`.
    pub coordinator: SagaCoordinator,
}
