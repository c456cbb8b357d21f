//! HTTP router wiring for the auth service.

use crate::handlers::{login, register, validate};
use crate::AppState;
use axum::routing::{get, post};
use axum::Router;
use saga_web::{correlation_id_layer, health_check};

/// Builds the full auth-service router.
///
/// # Routes
///
/// - `GET /health`
/// - `POST /register`
/// - `POST /login`
/// - `POST /validate`
#[must_use]
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/validate", post(validate))
        .layer(correlation_id_layer())
        .with_state(state)
}
