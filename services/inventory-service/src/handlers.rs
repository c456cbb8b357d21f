//! HTTP handlers for the inventory service's normative and orchestrator-only surface.

use crate::AppState;
use axum::extract::{Query, State};
use axum::Json;
use saga_core::{Money, OrderId, ProductId};
use saga_domain::catalog::Product;
use saga_web::{AppError, WebResult};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// `GET /catalog`: every product currently stocked.
pub async fn list_catalog(State(state): State<AppState>) -> Json<Vec<Product>> {
    Json(state.catalog.list().await)
}

#[derive(Debug, Deserialize)]
pub struct PricesQuery {
    /// Comma-separated product ids, e.g. `?id=prod-1,prod-2`.
    id: String,
}

/// `GET /products/prices?id=…`: unit price for each requested product id.
///
/// # Errors
///
/// Returns [`AppError::not_found`] if none of the requested ids resolve.
pub async fn product_prices(
    State(state): State<AppState>,
    Query(query): Query<PricesQuery>,
) -> WebResult<Json<HashMap<ProductId, Money>>> {
    let ids: Vec<ProductId> = query.id.split(',').map(str::trim).filter(|s| !s.is_empty()).map(ProductId::new).collect();
    let prices = state.catalog.prices(&ids).await;
    if prices.is_empty() {
        return Err(AppError::not_found("product", query.id));
    }
    Ok(Json(prices))
}

#[derive(Debug, Deserialize)]
pub struct LineItemBody {
    product_id: ProductId,
    quantity: u32,
}

#[derive(Debug, Deserialize)]
pub struct ReserveRequest {
    order_id: OrderId,
    #[allow(dead_code)]
    customer_id: saga_core::CustomerId,
    items: Vec<LineItemBody>,
}

#[derive(Debug, Serialize)]
pub struct ReserveResponse {
    total: Money,
}

/// `POST /reserve` (orchestrator-only): reserves stock directly against the
/// catalog, bypassing the choreography event bus.
///
/// # Errors
///
/// Returns [`AppError::conflict`] if any line item can't be satisfied.
pub async fn reserve(
    State(state): State<AppState>,
    Json(request): Json<ReserveRequest>,
) -> WebResult<Json<ReserveResponse>> {
    let items: Vec<(ProductId, u32)> =
        request.items.into_iter().map(|item| (item.product_id, item.quantity)).collect();
    match state.catalog.reserve(&items).await {
        Ok(total) => Ok(Json(ReserveResponse { total })),
        Err(err) => {
            tracing::info!(order_id = %request.order_id, %err, "orchestrated reservation rejected");
            Err(AppError::conflict(err.to_string()))
        },
    }
}

#[derive(Debug, Deserialize)]
pub struct RevertRequest {
    #[allow(dead_code)]
    order_id: OrderId,
    items: Vec<LineItemBody>,
    #[allow(dead_code)]
    reason: String,
}

/// `POST /revert` (orchestrator-only): releases previously reserved stock.
pub async fn revert(State(state): State<AppState>, Json(request): Json<RevertRequest>) -> axum::http::StatusCode {
    let items: Vec<(ProductId, u32)> =
        request.items.into_iter().map(|item| (item.product_id, item.quantity)).collect();
    state.catalog.release(&items).await;
    axum::http::StatusCode::OK
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::router::build_router;
    use axum::body::Body;
    use axum::http::Request;
    use saga_core::CustomerId;
    use saga_domain::Catalog;
    use tower::ServiceExt;

    async fn seeded_state() -> AppState {
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
        AppState { catalog }
    }

    #[tokio::test]
    async fn catalog_lists_seeded_products() {
        let app = build_router(seeded_state().await);
        let response = app
            .oneshot(Request::builder().uri("/catalog").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), 200);
    }

    #[tokio::test]
    async fn reserve_then_revert_restores_availability() {
        let state = seeded_state().await;
        let app = build_router(state.clone());

        let reserve_body = serde_json::json!({
            "order_id": "ord-1",
            "customer_id": "cust-1",
            "items": [{"product_id": "prod-1", "quantity": 2}],
        });
        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/reserve")
                    .header("content-type", "application/json")
                    .body(Body::from(reserve_body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), 200);
        assert_eq!(state.catalog.get(&ProductId::new("prod-1")).await.unwrap().available, 8);

        let revert_body = serde_json::json!({
            "order_id": "ord-1",
            "items": [{"product_id": "prod-1", "quantity": 2}],
            "reason": "payment declined",
        });
        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/revert")
                    .header("content-type", "application/json")
                    .body(Body::from(revert_body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), 200);
        assert_eq!(state.catalog.get(&ProductId::new("prod-1")).await.unwrap().available, 10);
    }

    #[tokio::test]
    async fn prices_rejects_when_nothing_resolves() {
        let app = build_router(seeded_state().await);
        let response = app
            .oneshot(Request::builder().uri("/products/prices?id=ghost").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), 404);
    }

    #[test]
    fn customer_id_field_is_accepted_even_though_unused_here() {
        let _ = CustomerId::new("cust-1");
    }
}
