//! Outbound HTTP calls to the order, inventory, and payment services.
//!
//! Beyond the normative surface in the HTTP contract, each downstream
//! service also exposes a small set of orchestrator-only endpoints
//! (`/reserve`, `/revert`, `/charge`, `/refund`, `/confirm`) so the
//! coordinator can drive participants synchronously without going through
//! the choreography event bus at all.

use saga_core::{CustomerId, Money, OrderId, ProductId};
use saga_runtime::{retry_with_policy, RetryPolicy};
use serde::{Deserialize, Serialize};

/// Why an outbound saga step call failed.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ClientError {
    /// The call transported but the service returned a non-2xx status.
    #[error("{service} responded {status}: {body}")]
    ServiceError {
        /// Which downstream service answered.
        service: &'static str,
        /// The HTTP status returned.
        status: u16,
        /// The response body, for diagnostics.
        body: String,
    },
    /// The call never reached the service, or timed out, or retries were exhausted.
    #[error("{service} unreachable: {reason}")]
    Transport {
        /// Which downstream service was being called.
        service: &'static str,
        /// The underlying transport error.
        reason: String,
    },
}

/// One requested line item, as sent to the order and inventory services.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LineItemRequest {
    /// The product being ordered.
    pub product_id: ProductId,
    /// Units requested.
    pub quantity: u32,
}

#[derive(Serialize)]
struct CreateOrderRequest {
    customer_id: CustomerId,
    items: Vec<LineItemRequest>,
}

/// Response body from `POST /create_order`.
#[derive(Clone, Debug, Deserialize)]
pub struct CreateOrderResponse {
    /// The newly minted order id.
    pub order_id: OrderId,
    /// A human-readable acknowledgement.
    pub message: String,
}

#[derive(Serialize)]
struct ReserveRequest {
    order_id: OrderId,
    customer_id: CustomerId,
    items: Vec<LineItemRequest>,
}

/// Response body from `POST /reserve`.
#[derive(Clone, Debug, Deserialize)]
pub struct ReserveResponse {
    /// The order's total, computed by the inventory service from the
    /// reserved items' snapshot prices.
    pub total: Money,
}

#[derive(Serialize)]
struct RevertInventoryRequest {
    order_id: OrderId,
    items: Vec<LineItemRequest>,
    reason: String,
}

#[derive(Serialize)]
struct ChargeRequest {
    order_id: OrderId,
    customer_id: CustomerId,
    amount: Money,
}

#[derive(Serialize)]
struct RefundRequest {
    order_id: OrderId,
}

#[derive(Serialize)]
struct ConfirmOrderRequest {
    order_id: OrderId,
    customer_id: CustomerId,
    status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    reason: Option<String>,
}

/// Base URLs + HTTP client for the three downstream saga participants.
#[derive(Clone)]
pub struct ServiceEndpoints {
    /// Base URL of the order service (e.g. `http://order-service:8081`).
    pub order_service_url: String,
    /// Base URL of the inventory service.
    pub inventory_service_url: String,
    /// Base URL of the payment service.
    pub payment_service_url: String,
}

/// Synchronous HTTP client the orchestrated coordinator drives each saga
/// step through. Every call is retried per `policy` before surfacing a
/// [`ClientError`].
#[derive(Clone)]
pub struct ServiceClient {
    http: reqwest::Client,
    endpoints: ServiceEndpoints,
    policy: RetryPolicy,
}

impl ServiceClient {
    /// Builds a client against `endpoints`, retrying failed calls per `policy`.
    #[must_use]
    pub fn new(endpoints: ServiceEndpoints, policy: RetryPolicy) -> Self {
        Self { http: reqwest::Client::new(), endpoints, policy }
    }

    /// Builds a client bounding each individual HTTP call by `call_timeout`,
    /// in addition to retrying per `policy`.
    #[must_use]
    pub fn with_call_timeout(
        endpoints: ServiceEndpoints,
        policy: RetryPolicy,
        call_timeout: std::time::Duration,
    ) -> Self {
        let http = reqwest::Client::builder()
            .timeout(call_timeout)
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        Self { http, endpoints, policy }
    }

    /// `POST {order_service}/create_order`.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] if the call fails after retries.
    pub async fn create_order(
        &self,
        customer_id: &CustomerId,
        items: &[LineItemRequest],
    ) -> Result<CreateOrderResponse, ClientError> {
        let url = format!("{}/create_order", self.endpoints.order_service_url);
        let body = CreateOrderRequest { customer_id: customer_id.clone(), items: items.to_vec() };
        self.post_json("order-service", "create_order", &url, &body).await
    }

    /// `POST {inventory_service}/reserve`.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] if the call fails after retries.
    pub async fn reserve_inventory(
        &self,
        order_id: &OrderId,
        customer_id: &CustomerId,
        items: &[LineItemRequest],
    ) -> Result<ReserveResponse, ClientError> {
        let url = format!("{}/reserve", self.endpoints.inventory_service_url);
        let body = ReserveRequest {
            order_id: order_id.clone(),
            customer_id: customer_id.clone(),
            items: items.to_vec(),
        };
        self.post_json("inventory-service", "reserve_inventory", &url, &body).await
    }

    /// `POST {inventory_service}/revert`: compensates [`Self::reserve_inventory`].
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] if the call fails after retries.
    pub async fn revert_inventory(
        &self,
        order_id: &OrderId,
        items: &[LineItemRequest],
        reason: &str,
    ) -> Result<(), ClientError> {
        let url = format!("{}/revert", self.endpoints.inventory_service_url);
        let body = RevertInventoryRequest {
            order_id: order_id.clone(),
            items: items.to_vec(),
            reason: reason.to_string(),
        };
        self.post_json_no_body("inventory-service", "revert_inventory", &url, &body).await
    }

    /// `POST {payment_service}/charge`.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] if the call fails after retries.
    pub async fn charge_payment(
        &self,
        order_id: &OrderId,
        customer_id: &CustomerId,
        amount: Money,
    ) -> Result<(), ClientError> {
        let url = format!("{}/charge", self.endpoints.payment_service_url);
        let body = ChargeRequest { order_id: order_id.clone(), customer_id: customer_id.clone(), amount };
        self.post_json_no_body("payment-service", "charge_payment", &url, &body).await
    }

    /// `POST {payment_service}/refund`: compensates [`Self::charge_payment`].
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] if the call fails after retries.
    pub async fn refund_payment(&self, order_id: &OrderId) -> Result<(), ClientError> {
        let url = format!("{}/refund", self.endpoints.payment_service_url);
        let body = RefundRequest { order_id: order_id.clone() };
        self.post_json_no_body("payment-service", "refund_payment", &url, &body).await
    }

    /// `POST {order_service}/confirm`: sets the order's terminal status.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] if the call fails after retries.
    pub async fn confirm_order(
        &self,
        order_id: &OrderId,
        customer_id: &CustomerId,
        status: &'static str,
        reason: Option<String>,
    ) -> Result<(), ClientError> {
        let url = format!("{}/confirm", self.endpoints.order_service_url);
        let body = ConfirmOrderRequest { order_id: order_id.clone(), customer_id: customer_id.clone(), status, reason };
        self.post_json_no_body("order-service", "confirm_order", &url, &body).await
    }

    async fn post_json<Req, Res>(
        &self,
        service: &'static str,
        operation: &str,
        url: &str,
        body: &Req,
    ) -> Result<Res, ClientError>
    where
        Req: Serialize,
        Res: for<'de> Deserialize<'de>,
    {
        retry_with_policy(&self.policy, operation, || async {
            let response = self
                .http
                .post(url)
                .json(body)
                .send()
                .await
                .map_err(|err| ClientError::Transport { service, reason: err.to_string() })?;

            let status = response.status();
            if !status.is_success() {
                let text = response.text().await.unwrap_or_default();
                return Err(ClientError::ServiceError { service, status: status.as_u16(), body: text });
            }

            response
                .json::<Res>()
                .await
                .map_err(|err| ClientError::Transport { service, reason: err.to_string() })
        })
        .await
    }

    async fn post_json_no_body<Req>(
        &self,
        service: &'static str,
        operation: &str,
        url: &str,
        body: &Req,
    ) -> Result<(), ClientError>
    where
        Req: Serialize,
    {
        retry_with_policy(&self.policy, operation, || async {
            let response = self
                .http
                .post(url)
                .json(body)
                .send()
                .await
                .map_err(|err| ClientError::Transport { service, reason: err.to_string() })?;

            let status = response.status();
            if !status.is_success() {
                let text = response.text().await.unwrap_or_default();
                return Err(ClientError::ServiceError { service, status: status.as_u16(), body: text });
            }

            Ok(())
        })
        .await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use axum::routing::post;
    use axum::{Json, Router};
    use std::time::Duration;

    async fn spawn_order_service() -> String {
        async fn create_order(Json(_req): Json<serde_json::Value>) -> Json<CreateOrderResponse> {
            Json(CreateOrderResponse { order_id: OrderId::new("ord-1"), message: "order accepted".to_string() })
        }

        let app = Router::new().route("/create_order", post(create_order));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}")
    }

    async fn spawn_failing_service(path: &'static str) -> String {
        async fn reject() -> axum::http::StatusCode {
            axum::http::StatusCode::BAD_REQUEST
        }

        let app = Router::new().route(path, post(reject));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}")
    }

    fn fast_policy() -> RetryPolicy {
        RetryPolicy::new().with_max_attempts(2).with_initial_delay(Duration::from_millis(1))
    }

    #[tokio::test]
    async fn create_order_parses_success_response() {
        let base = spawn_order_service().await;
        let endpoints = ServiceEndpoints {
            order_service_url: base,
            inventory_service_url: String::new(),
            payment_service_url: String::new(),
        };
        let client = ServiceClient::new(endpoints, fast_policy());

        let response = client
            .create_order(&CustomerId::new("cust-1"), &[LineItemRequest { product_id: ProductId::new("prod-1"), quantity: 1 }])
            .await
            .unwrap();

        assert_eq!(response.order_id, OrderId::new("ord-1"));
    }

    #[tokio::test]
    async fn non_2xx_response_surfaces_as_service_error_after_retries() {
        let base = spawn_failing_service("/reserve").await;
        let endpoints = ServiceEndpoints {
            order_service_url: String::new(),
            inventory_service_url: base,
            payment_service_url: String::new(),
        };
        let client = ServiceClient::new(endpoints, fast_policy());

        let result = client
            .reserve_inventory(
                &OrderId::new("ord-1"),
                &CustomerId::new("cust-1"),
                &[LineItemRequest { product_id: ProductId::new("prod-1"), quantity: 1 }],
            )
            .await;

        assert!(matches!(result, Err(ClientError::ServiceError { status: 400, .. })));
    }
}
