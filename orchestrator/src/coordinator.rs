//! The orchestrated saga: sequential step execution with reverse-order
//! compensation on failure.

use crate::client::{ClientError, LineItemRequest, ServiceClient};
use crate::saga_log::{SagaLog, StepStatus};
use chrono::Utc;
use saga_core::{CustomerId, Money, OrderId};
use std::time::Duration;

const STEP_CREATE_ORDER: &str = "CreateOrder";
const STEP_RESERVE_INVENTORY: &str = "ReserveInventory";
const STEP_PROCESS_PAYMENT: &str = "ProcessPayment";
const STEP_CONFIRM_ORDER: &str = "ConfirmOrder";
const STEP_COMP_A: &str = "Comp-A";
const STEP_COMP_B: &str = "Comp-B";

/// How the saga ended.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SagaOutcome {
    /// All four steps completed; the order is `approved`.
    Approved {
        /// The order that was approved.
        order_id: OrderId,
    },
    /// A step failed and compensation unwound everything that had completed;
    /// the order is `rejected`.
    Rejected {
        /// The order that was rejected.
        order_id: OrderId,
        /// Why.
        reason: String,
    },
    /// A step failed, compensation was attempted, and the compensation
    /// itself failed. The order still ends `rejected`; the compound reason
    /// and the saga log are there for operator reconciliation.
    CompensationPartiallyFailed {
        /// The order that was rejected.
        order_id: OrderId,
        /// The original failure plus the compensation failure.
        reason: String,
    },
}

/// Why the saga could not even begin (no order was created, nothing to compensate).
#[derive(Debug, Clone, thiserror::Error)]
#[error("order creation failed: {0}")]
pub struct SagaCreationError(pub String);

/// Drives one saga from `CreateOrder` through `ConfirmOrder`, recording every
/// transition in a [`SagaLog`] and compensating in reverse completion order
/// on failure.
#[derive(Clone)]
pub struct SagaCoordinator {
    client: ServiceClient,
    log: SagaLog,
    deadline: Duration,
}

impl SagaCoordinator {
    /// Builds a coordinator against `client`, bounding the whole saga by `deadline`.
    #[must_use]
    pub fn new(client: ServiceClient, log: SagaLog, deadline: Duration) -> Self {
        Self { client, log, deadline }
    }

    /// The saga log this coordinator records transitions into.
    #[must_use]
    pub fn log(&self) -> &SagaLog {
        &self.log
    }

    /// Runs one saga to completion (approved, rejected, or partially-failed
    /// compensation), bounded by the coordinator's configured deadline.
    pub async fn run_saga(
        &self,
        customer_id: CustomerId,
        items: Vec<LineItemRequest>,
    ) -> Result<SagaOutcome, SagaCreationError> {
        match tokio::time::timeout(self.deadline, self.run_saga_inner(customer_id, items)).await {
            Ok(outcome) => outcome,
            Err(_) => Err(SagaCreationError("saga exceeded its deadline".to_string())),
        }
    }

    async fn run_saga_inner(
        &self,
        customer_id: CustomerId,
        items: Vec<LineItemRequest>,
    ) -> Result<SagaOutcome, SagaCreationError> {
        let order_id = self.create_order(&customer_id, &items).await?;

        let total = match self.reserve_inventory(&order_id, &customer_id, &items).await {
            Ok(total) => total,
            Err(reason) => return Ok(self.compensate_a(&order_id, &customer_id, reason).await),
        };

        if let Err(reason) = self.process_payment(&order_id, &customer_id, total).await {
            return Ok(self.compensate_b(&order_id, &customer_id, &items, reason).await);
        }

        self.confirm(&order_id, &customer_id, "approved", None).await;
        Ok(SagaOutcome::Approved { order_id })
    }

    async fn create_order(
        &self,
        customer_id: &CustomerId,
        items: &[LineItemRequest],
    ) -> Result<OrderId, SagaCreationError> {
        match self.client.create_order(customer_id, items).await {
            Ok(response) => {
                self.log
                    .record(&response.order_id, STEP_CREATE_ORDER, StepStatus::Completed, None, Utc::now())
                    .await;
                Ok(response.order_id)
            },
            Err(err) => Err(SagaCreationError(err.to_string())),
        }
    }

    async fn reserve_inventory(
        &self,
        order_id: &OrderId,
        customer_id: &CustomerId,
        items: &[LineItemRequest],
    ) -> Result<Money, String> {
        self.log.record(order_id, STEP_RESERVE_INVENTORY, StepStatus::Started, None, Utc::now()).await;
        match self.client.reserve_inventory(order_id, customer_id, items).await {
            Ok(response) => {
                self.log
                    .record(order_id, STEP_RESERVE_INVENTORY, StepStatus::Completed, None, Utc::now())
                    .await;
                Ok(response.total)
            },
            Err(err) => {
                let reason = err.to_string();
                self.log
                    .record(
                        order_id,
                        STEP_RESERVE_INVENTORY,
                        StepStatus::Failed,
                        Some(reason.clone()),
                        Utc::now(),
                    )
                    .await;
                Err(reason)
            },
        }
    }

    async fn process_payment(
        &self,
        order_id: &OrderId,
        customer_id: &CustomerId,
        amount: Money,
    ) -> Result<(), String> {
        self.log.record(order_id, STEP_PROCESS_PAYMENT, StepStatus::Started, None, Utc::now()).await;
        match self.client.charge_payment(order_id, customer_id, amount).await {
            Ok(()) => {
                self.log
                    .record(order_id, STEP_PROCESS_PAYMENT, StepStatus::Completed, None, Utc::now())
                    .await;
                Ok(())
            },
            Err(err) => {
                let reason = err.to_string();
                self.log
                    .record(order_id, STEP_PROCESS_PAYMENT, StepStatus::Failed, Some(reason.clone()), Utc::now())
                    .await;
                Err(reason)
            },
        }
    }

    /// Comp-A: inventory reservation failed, nothing downstream ran yet.
    async fn compensate_a(&self, order_id: &OrderId, customer_id: &CustomerId, reason: String) -> SagaOutcome {
        self.log.record(order_id, STEP_COMP_A, StepStatus::Compensating, None, Utc::now()).await;
        self.confirm(order_id, customer_id, "rejected", Some(reason.clone())).await;
        self.log.record(order_id, STEP_COMP_A, StepStatus::Compensated, None, Utc::now()).await;
        metrics::counter!("orchestrator.saga.rejected", "step" => STEP_RESERVE_INVENTORY).increment(1);
        SagaOutcome::Rejected { order_id: order_id.clone(), reason }
    }

    /// Comp-B: payment failed after inventory was reserved, release stock, then reject.
    async fn compensate_b(
        &self,
        order_id: &OrderId,
        customer_id: &CustomerId,
        items: &[LineItemRequest],
        reason: String,
    ) -> SagaOutcome {
        self.log.record(order_id, STEP_COMP_B, StepStatus::Compensating, None, Utc::now()).await;

        let revert_outcome = self.client.revert_inventory(order_id, items, &reason).await;
        let revert_reason = match &revert_outcome {
            Ok(()) => None,
            Err(err) => Some(err.to_string()),
        };
        self.log
            .record(order_id, STEP_COMP_B, StepStatus::Compensated, revert_reason.clone(), Utc::now())
            .await;

        self.confirm(order_id, customer_id, "rejected", Some(reason.clone())).await;
        metrics::counter!("orchestrator.saga.rejected", "step" => STEP_PROCESS_PAYMENT).increment(1);

        match revert_reason {
            None => SagaOutcome::Rejected { order_id: order_id.clone(), reason },
            Some(revert_err) => {
                tracing::warn!(%order_id, %revert_err, "inventory revert failed during compensation, order still rejected");
                SagaOutcome::CompensationPartiallyFailed {
                    order_id: order_id.clone(),
                    reason: format!("{reason}; compensation also failed: {revert_err}"),
                }
            },
        }
    }

    async fn confirm(&self, order_id: &OrderId, customer_id: &CustomerId, status: &'static str, reason: Option<String>) {
        self.log.record(order_id, STEP_CONFIRM_ORDER, StepStatus::Started, None, Utc::now()).await;
        match self.client.confirm_order(order_id, customer_id, status, reason).await {
            Ok(()) => {
                self.log.record(order_id, STEP_CONFIRM_ORDER, StepStatus::Completed, None, Utc::now()).await;
            },
            Err(err) => {
                tracing::error!(%order_id, %err, "failed to confirm terminal order status");
                self.log
                    .record(order_id, STEP_CONFIRM_ORDER, StepStatus::Failed, Some(err.to_string()), Utc::now())
                    .await;
            },
        }
    }
}

impl From<ClientError> for SagaCreationError {
    fn from(err: ClientError) -> Self {
        Self(err.to_string())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::client::{CreateOrderResponse, ReserveResponse, ServiceEndpoints};
    use axum::routing::post;
    use axum::{Json, Router};
    use saga_core::ProductId;
    use saga_runtime::RetryPolicy;

    async fn spawn(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{addr}")
    }

    async fn happy_path_coordinator() -> SagaCoordinator {
        async fn create_order(Json(_req): Json<serde_json::Value>) -> Json<CreateOrderResponse> {
            Json(CreateOrderResponse { order_id: OrderId::new("ord-1"), message: "order accepted".to_string() })
        }
        async fn reserve(Json(_req): Json<serde_json::Value>) -> Json<ReserveResponse> {
            Json(ReserveResponse { total: Money::from_cents(3980) })
        }
        async fn ok() -> axum::http::StatusCode {
            axum::http::StatusCode::OK
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
        SagaCoordinator::new(client, SagaLog::new(), Duration::from_secs(5))
    }

    #[tokio::test]
    async fn full_saga_approves_order_when_every_step_succeeds() {
        let coordinator = happy_path_coordinator().await;

        let outcome = coordinator
            .run_saga(
                CustomerId::new("cust-1"),
                vec![LineItemRequest { product_id: ProductId::new("prod-1"), quantity: 2 }],
            )
            .await
            .unwrap();

        assert_eq!(outcome, SagaOutcome::Approved { order_id: OrderId::new("ord-1") });
        let steps = coordinator.log().steps_for(&OrderId::new("ord-1")).await;
        assert!(steps.iter().any(|s| s.step_name == STEP_CONFIRM_ORDER && s.status == StepStatus::Completed));
    }

    #[tokio::test]
    async fn payment_failure_triggers_comp_b_and_rejects_order() {
        async fn create_order(Json(_req): Json<serde_json::Value>) -> Json<CreateOrderResponse> {
            Json(CreateOrderResponse { order_id: OrderId::new("ord-1"), message: "order accepted".to_string() })
        }
        async fn reserve(Json(_req): Json<serde_json::Value>) -> Json<ReserveResponse> {
            Json(ReserveResponse { total: Money::from_cents(3980) })
        }
        async fn ok() -> axum::http::StatusCode {
            axum::http::StatusCode::OK
        }
        async fn decline() -> axum::http::StatusCode {
            axum::http::StatusCode::PAYMENT_REQUIRED
        }

        let order_url = spawn(Router::new().route("/create_order", post(create_order)).route("/confirm", post(ok))).await;
        let inventory_url =
            spawn(Router::new().route("/reserve", post(reserve)).route("/revert", post(ok))).await;
        let payment_url = spawn(Router::new().route("/charge", post(decline))).await;

        let endpoints = ServiceEndpoints {
            order_service_url: order_url,
            inventory_service_url: inventory_url,
            payment_service_url: payment_url,
        };
        let client = ServiceClient::new(endpoints, RetryPolicy::new().with_max_attempts(1));
        let coordinator = SagaCoordinator::new(client, SagaLog::new(), Duration::from_secs(5));

        let outcome = coordinator
            .run_saga(
                CustomerId::new("cust-1"),
                vec![LineItemRequest { product_id: ProductId::new("prod-1"), quantity: 2 }],
            )
            .await
            .unwrap();

        assert!(matches!(outcome, SagaOutcome::Rejected { .. }));
        let steps = coordinator.log().steps_for(&OrderId::new("ord-1")).await;
        assert!(steps.iter().any(|s| s.step_name == STEP_COMP_B && s.status == StepStatus::Compensated));
    }
}
