//! HTTP handlers for the order service.

use crate::AppState;
use axum::extract::{Path, Query, State};
use axum::Json;
use saga_choreography::OrderAction;
use saga_core::{CustomerId, OrderId, ProductId};
use saga_domain::{Order, OrderStatus};
use saga_web::{AppError, WebResult};
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct LineItemRequest {
    product_id: ProductId,
    quantity: u32,
}

#[derive(Debug, Deserialize)]
pub struct CreateOrderRequest {
    customer_id: CustomerId,
    items: Vec<LineItemRequest>,
}

#[derive(Debug, Serialize)]
pub struct CreateOrderResponse {
    order_id: OrderId,
    message: String,
}

/// `POST /create_order`: both the client-facing endpoint (§6) and the
/// orchestrator's synchronous peer call for the same operation.
///
/// Sends `CreateOrder` to the order participant and waits for its feedback
/// action, so the caller sees the minted `order_id` (or a clear failure
/// reason) instead of a bare "accepted" with no way to find out what
/// happened.
///
/// # Errors
///
/// Returns [`AppError::bad_request`] if the participant rejects the order,
/// or [`AppError::timeout`] if no feedback arrives within the configured
/// deadline.
pub async fn create_order(
    State(state): State<AppState>,
    Json(request): Json<CreateOrderRequest>,
) -> WebResult<(axum::http::StatusCode, Json<CreateOrderResponse>)> {
    let items: Vec<(ProductId, u32)> =
        request.items.into_iter().map(|item| (item.product_id, item.quantity)).collect();
    let action = OrderAction::CreateOrder { customer_id: request.customer_id, items };

    let outcome = state
        .store
        .send_and_wait_for(
            action,
            |action| matches!(action, OrderAction::OrderAccepted { .. } | OrderAction::CreateOrderFailed { .. }),
            state.create_order_timeout,
        )
        .await
        .map_err(|err| AppError::timeout(err.to_string()))?;

    match outcome {
        OrderAction::OrderAccepted { order_id, message } => {
            Ok((axum::http::StatusCode::ACCEPTED, Json(CreateOrderResponse { order_id, message })))
        },
        OrderAction::CreateOrderFailed { reason } => Err(AppError::bad_request(reason)),
        _ => unreachable!("predicate only matches OrderAccepted/CreateOrderFailed"),
    }
}

#[derive(Debug, Deserialize)]
pub struct OrdersQuery {
    customer_id: CustomerId,
}

/// `GET /orders?customer_id=`.
pub async fn list_orders(State(state): State<AppState>, Query(query): Query<OrdersQuery>) -> Json<Vec<Order>> {
    Json(state.order_store.list_by_customer(&query.customer_id).await)
}

/// `GET /orders/{id}`.
///
/// # Errors
///
/// Returns [`AppError::not_found`] if no such order exists.
pub async fn get_order(State(state): State<AppState>, Path(order_id): Path<String>) -> WebResult<Json<Order>> {
    let order_id = OrderId::new(order_id);
    state
        .order_store
        .get(&order_id)
        .await
        .map(Json)
        .ok_or_else(|| AppError::not_found("order", order_id))
}

#[derive(Debug, Deserialize)]
pub struct ConfirmRequest {
    order_id: OrderId,
    customer_id: CustomerId,
    status: String,
    #[serde(default)]
    reason: Option<String>,
}

/// `POST /confirm` (orchestrator-only): sets the order's terminal status
/// directly, bypassing the event bus the choreographed flow would use.
pub async fn confirm(State(state): State<AppState>, Json(request): Json<ConfirmRequest>) -> axum::http::StatusCode {
    let status = match request.status.as_str() {
        "approved" => OrderStatus::Approved,
        "rejected" => OrderStatus::Rejected,
        _ => return axum::http::StatusCode::BAD_REQUEST,
    };
    state.order_store.set_status(&request.order_id, &request.customer_id, status, request.reason).await;
    axum::http::StatusCode::OK
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::router::build_router;
    use axum::body::Body;
    use axum::http::Request;
    use saga_choreography::OrderParticipantEnvironment;
    use saga_core::{Clock, EventBus, Money};
    use saga_domain::catalog::Product;
    use saga_domain::Catalog;
    use saga_runtime::Store;
    use saga_testing::mocks::{test_clock, InMemoryEventBus};
    use std::sync::Arc;
    use std::time::Duration;
    use tower::ServiceExt;

    async fn state() -> AppState {
        let catalog = Catalog::new();
        catalog
            .upsert(Product {
                product_id: ProductId::new("prod-1"),
                name: "Widget".into(),
                description: String::new(),
                price: Money::from_cents(1990),
                available: 10,
                image_url: None,
            })
            .await;
        let order_store = saga_domain::OrderStore::new();
        let event_bus: Arc<dyn EventBus> = Arc::new(InMemoryEventBus::new());
        let clock: Arc<dyn Clock> = Arc::new(test_clock());
        let environment = OrderParticipantEnvironment {
            order_store: order_store.clone(),
            price_source: Arc::new(catalog),
            event_bus,
            clock,
        };
        let store = Store::new(saga_choreography::OrderParticipantState, saga_choreography::OrderParticipantReducer, environment);
        AppState { store, order_store, create_order_timeout: Duration::from_secs(2) }
    }

    #[tokio::test]
    async fn create_order_returns_202_with_order_id() {
        let app = build_router(state().await);
        let body = serde_json::json!({
            "customer_id": "cust-1",
            "items": [{"product_id": "prod-1", "quantity": 2}],
        });
        let response = app
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
        assert_eq!(response.status(), 202);
    }

    #[tokio::test]
    async fn create_order_rejects_unknown_product_with_400() {
        let app = build_router(state().await);
        let body = serde_json::json!({
            "customer_id": "cust-1",
            "items": [{"product_id": "ghost", "quantity": 1}],
        });
        let response = app
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
        assert_eq!(response.status(), 400);
    }

    #[tokio::test]
    async fn get_order_404s_for_unknown_id() {
        let app = build_router(state().await);
        let response = app
            .oneshot(Request::builder().uri("/orders/ghost").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), 404);
    }
}
