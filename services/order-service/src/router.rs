//! HTTP router wiring for the order service.

use crate::handlers::{confirm, create_order, get_order, list_orders};
use crate::AppState;
use axum::routing::{get, post};
use axum::Router;
use saga_web::{correlation_id_layer, health_check};

/// Builds the full order-service router.
///
/// # Routes
///
/// - `GET /health`
/// - `POST /create_order`
/// - `GET /orders`
/// - `GET /orders/:id`
/// - `POST /confirm` (orchestrator-only)
#[must_use]
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/create_order", post(create_order))
        .route("/orders", get(list_orders))
        .route("/orders/:id", get(get_order))
        .route("/confirm", post(confirm))
        .layer(correlation_id_layer())
        .with_state(state)
}
