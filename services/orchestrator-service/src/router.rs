//! HTTP router wiring for the orchestrator service.

use crate::handlers::{run_saga, saga_log};
use crate::AppState;
use axum::routing::{get, post};
use axum::Router;
use saga_web::{correlation_id_layer, health_check};

/// Builds the full orchestrator-service router.
///
/// # Routes
///
/// - `GET /health`
/// - `POST /saga` and `POST /create_order` (aliases for the same orchestrated run)
/// - `GET /sagas/{order_id}` (operator-facing step log, not part of the client contract)
#[must_use]
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/saga", post(run_saga))
        .route("/create_order", post(run_saga))
        .route("/sagas/:order_id", get(saga_log))
        .layer(correlation_id_layer())
        .with_state(state)
}
