//! HTTP handlers for the payment service's orchestrator-only surface.
//!
//! This service has no normative HTTP surface of its own (§6 lists no
//! client-facing endpoints for it): `/charge` and `/refund` only exist for
//! the orchestrated saga's synchronous peer calls.

use crate::AppState;
use axum::extract::State;
use axum::Json;
use saga_core::{CustomerId, Money, OrderId};
use saga_web::{AppError, WebResult};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct ChargeRequest {
    order_id: OrderId,
    customer_id: CustomerId,
    amount: Money,
}

/// `POST /charge` (orchestrator-only).
///
/// # Errors
///
/// Returns [`AppError::conflict`] if the gateway declines the charge.
pub async fn charge(State(state): State<AppState>, Json(request): Json<ChargeRequest>) -> WebResult<axum::http::StatusCode> {
    state
        .gateway
        .charge(&request.order_id, &request.customer_id, request.amount)
        .await
        .map(|()| axum::http::StatusCode::OK)
        .map_err(|err| {
            tracing::info!(order_id = %request.order_id, %err, "orchestrated charge declined");
            AppError::conflict(err.to_string())
        })
}

#[derive(Debug, Deserialize)]
pub struct RefundRequest {
    order_id: OrderId,
}

/// `POST /refund` (orchestrator-only).
pub async fn refund(State(state): State<AppState>, Json(request): Json<RefundRequest>) -> axum::http::StatusCode {
    match state.gateway.refund(&request.order_id).await {
        Ok(()) => axum::http::StatusCode::OK,
        Err(err) => {
            tracing::warn!(order_id = %request.order_id, %err, "orchestrated refund declined");
            axum::http::StatusCode::OK
        },
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::router::build_router;
    use axum::body::Body;
    use axum::http::Request;
    use saga_payment::PaymentGateway;
    use tower::ServiceExt;

    fn state() -> AppState {
        AppState { gateway: PaymentGateway::new(Money::from_cents(200_000), 0.0) }
    }

    #[tokio::test]
    async fn charge_succeeds_and_refund_follows() {
        let app = build_router(state());

        let charge_body = serde_json::json!({"order_id": "ord-1", "customer_id": "cust-1", "amount": 1990});
        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/charge")
                    .header("content-type", "application/json")
                    .body(Body::from(charge_body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), 200);

        let refund_body = serde_json::json!({"order_id": "ord-1"});
        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/refund")
                    .header("content-type", "application/json")
                    .body(Body::from(refund_body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), 200);
    }

    #[tokio::test]
    async fn charge_over_limit_returns_conflict() {
        let app_state = AppState { gateway: PaymentGateway::new(Money::from_cents(1000), 0.0) };
        let app = build_router(app_state);

        let charge_body = serde_json::json!({"order_id": "ord-1", "customer_id": "cust-1", "amount": 5000});
        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/charge")
                    .header("content-type", "application/json")
                    .body(Body::from(charge_body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), 409);
    }
}
