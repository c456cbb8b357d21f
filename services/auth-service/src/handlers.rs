//! HTTP handlers for the auth service.

use crate::AppState;
use axum::extract::State;
use axum::Json;
use saga_auth::{AuthError, DEFAULT_NAMESPACE};
use saga_core::CustomerId;
use saga_web::{AppError, WebResult};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

fn parse_namespace(ns: Option<&str>) -> Uuid {
    ns.and_then(|ns| Uuid::parse_str(ns).ok()).unwrap_or(DEFAULT_NAMESPACE)
}

fn map_auth_error(err: AuthError) -> AppError {
    match err {
        AuthError::Validation(message) => AppError::bad_request(message),
        AuthError::Conflict { username } => AppError::conflict(format!("user already exists: {username}")),
        AuthError::Unauthorized => AppError::unauthorized("invalid username or password"),
        AuthError::UnknownCustomer { customer_id } => {
            AppError::unauthorized(format!("unknown customer: {customer_id}"))
        },
    }
}

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    username: String,
    password: String,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    ns: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    customer_id: CustomerId,
}

/// `POST /register`.
///
/// # Errors
///
/// Returns [`AppError::bad_request`] for invalid credentials or
/// [`AppError::conflict`] if the username is already registered.
pub async fn register(
    State(state): State<AppState>,
    Json(request): Json<RegisterRequest>,
) -> WebResult<(axum::http::StatusCode, Json<RegisterResponse>)> {
    let namespace = parse_namespace(request.ns.as_deref());
    let customer_id = state
        .users
        .register(&request.username, &request.password, request.email, request.name, namespace)
        .await
        .map_err(map_auth_error)?;
    Ok((axum::http::StatusCode::CREATED, Json(RegisterResponse { customer_id })))
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    username: String,
    password: String,
    #[serde(default)]
    ns: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    customer_id: CustomerId,
    status: &'static str,
    ns: String,
}

/// `POST /login`.
///
/// # Errors
///
/// Returns [`AppError::unauthorized`] for an unknown username or a password
/// mismatch.
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> WebResult<Json<LoginResponse>> {
    let namespace = parse_namespace(request.ns.as_deref());
    let customer_id = state.users.login(&request.username, &request.password, namespace).await.map_err(map_auth_error)?;
    Ok(Json(LoginResponse { customer_id, status: "success", ns: namespace.to_string() }))
}

#[derive(Debug, Deserialize)]
pub struct ValidateRequest {
    customer_id: CustomerId,
    #[serde(default)]
    ns: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ValidateResponse {
    customer_id: CustomerId,
    valid: bool,
}

/// `POST /validate`.
///
/// Unlike the other handlers, an unauthorized result here is a normal
/// `401 {valid:false}` response rather than a generic error body, so a
/// caller can distinguish "not valid" from a transport failure at the same
/// status code the other endpoints use for auth failures.
pub async fn validate(
    State(state): State<AppState>,
    Json(request): Json<ValidateRequest>,
) -> (axum::http::StatusCode, Json<ValidateResponse>) {
    let namespace = request.ns.as_deref().and_then(|ns| Uuid::parse_str(ns).ok());
    match state.users.validate(&request.customer_id, namespace).await {
        Ok(customer_id) => {
            (axum::http::StatusCode::OK, Json(ValidateResponse { customer_id, valid: true }))
        },
        Err(_) => (
            axum::http::StatusCode::UNAUTHORIZED,
            Json(ValidateResponse { customer_id: request.customer_id, valid: false }),
        ),
    }
}
