//! HTTP router wiring for the payment service.

use crate::handlers::{charge, refund};
use crate::AppState;
use axum::routing::{get, post};
use axum::Router;
use saga_web::{correlation_id_layer, health_check};

/// Builds the full payment-service router.
///
/// # Routes
///
/// - `GET /health`
/// - `POST /charge` (orchestrator-only)
/// - `POST /refund` (orchestrator-only)
#[must_use]
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/charge", post(charge))
        .route("/refund", post(refund))
        .layer(correlation_id_layer())
        .with_state(state)
}
