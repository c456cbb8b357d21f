//! Payment service: owns the [`PaymentGateway`](saga_payment::PaymentGateway)
//! transaction map.
//!
//! Serves two roles, mirroring `inventory-service`:
//!
//! - **Choreographed participant**: subscribes to `InventoryReserved` /
//!   `InventoryReservationFailed` / `RevertPayment`, drives a
//!   [`PaymentParticipantReducer`] and publishes `PaymentProcessed` /
//!   `PaymentFailed` / `OrderApproved` / `OrderRejected` / `RevertInventory`.
//! - **Orchestrator peer**: exposes `POST /charge` and `POST /refund`,
//!   called synchronously by `orchestrator-service`.

pub mod config;
pub mod consumer;
pub mod handlers;
pub mod router;

use saga_payment::PaymentGateway;

pub use config::Config;

/// Shared Axum state.
#[derive(Clone)]
pub struct AppState {
    /// The payment gateway, owned exclusively by this service.
    pub gateway: PaymentGateway,
}
