//! HTTP router wiring for the inventory service.

use crate::handlers::{list_catalog, product_prices, reserve, revert};
use crate::AppState;
use axum::routing::{get, post};
use axum::Router;
use saga_web::{correlation_id_layer, health_check};

/// Builds the full inventory-service router.
///
/// # Routes
///
/// - `GET /health`
/// - `GET /catalog`
/// - `GET /products/prices`
/// - `POST /reserve` (orchestrator-only)
/// - `POST /revert` (orchestrator-only)
#[must_use]
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/catalog", get(list_catalog))
        .route("/products/prices", get(product_prices))
        .route("/reserve", post(reserve))
        .route("/revert", post(revert))
        .layer(correlation_id_layer())
        .with_state(state)
}
