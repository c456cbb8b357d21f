//! HTTP handlers for the orchestrator service.

use crate::AppState;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use saga_core::{CustomerId, OrderId};
use saga_orchestrator::{LineItemRequest, SagaOutcome, SagaStepEvent};
use saga_web::{AppError, WebResult};
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct CreateOrderRequest {
    customer_id: CustomerId,
    items: Vec<LineItemRequest>,
}

#[derive(Debug, Serialize)]
pub struct CreateOrderResponse {
    order_id: OrderId,
    status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    reason: Option<String>,
}

/// `POST /saga` and `POST /create_order`: both names run the same
/// orchestrated saga from a single request body, ending with the order
/// either `approved` or `rejected`.
///
/// # Errors
///
/// Returns [`AppError::timeout`] if the saga exceeds its configured
/// deadline, or [`AppError::internal`] if the order could not even be
/// created in the first place.
pub async fn run_saga(
    State(state): State<AppState>,
    Json(request): Json<CreateOrderRequest>,
) -> WebResult<(StatusCode, Json<CreateOrderResponse>)> {
    let outcome = state
        .coordinator
        .run_saga(request.customer_id, request.items)
        .await
        .map_err(|err| AppError::timeout(err.to_string()))?;

    Ok(match outcome {
        SagaOutcome::Approved { order_id } => {
            (StatusCode::OK, Json(CreateOrderResponse { order_id, status: "approved", reason: None }))
        },
        SagaOutcome::Rejected { order_id, reason } => (
            StatusCode::OK,
            Json(CreateOrderResponse { order_id, status: "rejected", reason: Some(reason) }),
        ),
        SagaOutcome::CompensationPartiallyFailed { order_id, reason } => (
            StatusCode::OK,
            Json(CreateOrderResponse { order_id, status: "rejected", reason: Some(reason) }),
        ),
    })
}

/// `GET /sagas/{order_id}`: the step-by-step log recorded for one saga run,
/// for operator inspection. Not part of the client-facing contract.
///
/// # Errors
///
/// Returns [`AppError::not_found`] if no saga was ever recorded for the
/// given order id.
pub async fn saga_log(
    State(state): State<AppState>,
    Path(order_id): Path<String>,
) -> WebResult<Json<Vec<SagaStepEvent>>> {
    let order_id = OrderId::new(order_id);
    let steps = state.coordinator.log().steps_for(&order_id).await;
    if steps.is_empty() {
        return Err(AppError::not_found("saga", order_id));
    }
    Ok(Json(steps))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::router::build_router;
    use axum::body::Body;
    use axum::http::Request;
    use axum::routing::post;
    use axum::Router;
    use saga_orchestrator::{ReserveResponse, SagaCoordinator, SagaLog, ServiceClient, ServiceEndpoints};
    use saga_core::{Money, ProductId};
    use saga_runtime::RetryPolicy;
    use std::time::Duration;
    use tower::ServiceExt;

    async fn spawn(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{addr}")
    }

    async fn happy_path_state() -> AppState {
        async fn create_order(Json(_req): Json<serde_json::Value>) -> Json<saga_orchestrator::CreateOrderResponse> {
            Json(saga_orchestrator::CreateOrderResponse {
                order_id: OrderId::new("ord-1"),
                message: "order accepted".to_string(),
            })
        }
        async fn reserve(Json(_req): Json<serde_json::Value>) -> Json<ReserveResponse> {
            Json(ReserveResponse { total: Money::from_cents(1990) })
        }
        async fn ok() -> StatusCode {
            StatusCode::OK
        }

        let order_url = spawn(Router::new().route("/create_order", post(create_order)).route("/confirm", post(ok))).await;
        let inventory_url = spawn(Router::new().route("/reserve", post(reserve))).await;
        let payment_url = spawn(Router::new().route("/charge", post(ok))).await;

        let endpoints = ServiceEndpoints {
            order_service_url: order_url,
            inventory_service_url: inventory_url,
            payment_service_url: payment_url,
        };
        let client = ServiceClient::new(endpoints, RetryPolicy::new().with_max_attempts(1));
        AppState { coordinator: SagaCoordinator::new(client, SagaLog::new(), Duration::from_secs(5)) }
    }

    #[tokio::test]
    async fn run_saga_approves_order_and_then_exposes_its_log() {
        let app = build_router(happy_path_state().await);

        let body = serde_json::json!({
            "customer_id": "cust-1",
            "items": [{"product_id": "prod-1", "quantity": 2}],
        });
        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/create_order")
                    .header("content-type", "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let log_response = app
            .oneshot(Request::builder().method("GET").uri("/sagas/ord-1").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(log_response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn saga_log_for_unknown_order_is_404() {
        let app = build_router(happy_path_state().await);
        let response = app
            .oneshot(Request::builder().method("GET").uri("/sagas/never-seen").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
