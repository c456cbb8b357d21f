//! The orchestrated flow's append-only step log.
//!
//! Compensation walks this log in reverse and only compensates steps whose
//! *last* recorded status is [`StepStatus::Completed`] (a step that never
//! completed has nothing to undo).

use chrono::{DateTime, Utc};
use saga_core::OrderId;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Where a saga step sits in its lifecycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepStatus {
    /// The step's call is in flight.
    Started,
    /// The step's call succeeded.
    Completed,
    /// The step's call failed (after retries were exhausted).
    Failed,
    /// A compensation for this step is in flight.
    Compensating,
    /// The compensation for this step finished (successfully or not).
    Compensated,
}

/// One recorded transition for a named step of a given order's saga.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct SagaStepEvent {
    /// The saga this event belongs to.
    pub order_id: OrderId,
    /// `"CreateOrder"`, `"ReserveInventory"`, `"ProcessPayment"`, `"ConfirmOrder"`,
    /// or a `"Comp-*"` compensation step name.
    pub step_name: String,
    /// The step's status as of this event.
    pub status: StepStatus,
    /// When this transition was recorded.
    pub timestamp: DateTime<Utc>,
    /// Free-form context (an error message, a compensation outcome).
    pub details: Option<String>,
}

/// Append-only, per-order saga step log.
#[derive(Clone, Default)]
pub struct SagaLog {
    events: Arc<RwLock<HashMap<OrderId, Vec<SagaStepEvent>>>>,
}

impl SagaLog {
    /// Builds an empty log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a transition for `order_id`.
    pub async fn record(
        &self,
        order_id: &OrderId,
        step_name: &str,
        status: StepStatus,
        details: Option<String>,
        now: DateTime<Utc>,
    ) {
        let event = SagaStepEvent {
            order_id: order_id.clone(),
            step_name: step_name.to_string(),
            status,
            timestamp: now,
            details,
        };
        self.events.write().await.entry(order_id.clone()).or_default().push(event);
    }

    /// Returns every recorded event for `order_id`, in append order.
    pub async fn steps_for(&self, order_id: &OrderId) -> Vec<SagaStepEvent> {
        self.events.read().await.get(order_id).cloned().unwrap_or_default()
    }

    /// Returns the most recently recorded status for `step_name` within
    /// `order_id`'s saga, if that step was ever recorded.
    pub async fn last_status_of(&self, order_id: &OrderId, step_name: &str) -> Option<StepStatus> {
        self.events
            .read()
            .await
            .get(order_id)?
            .iter()
            .rev()
            .find(|event| event.step_name == step_name)
            .map(|event| event.status)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn last_status_of_reflects_most_recent_event() {
        let log = SagaLog::new();
        let order_id = OrderId::new("ord-1");
        let now = Utc::now();

        log.record(&order_id, "ReserveInventory", StepStatus::Started, None, now).await;
        log.record(&order_id, "ReserveInventory", StepStatus::Completed, None, now).await;

        assert_eq!(log.last_status_of(&order_id, "ReserveInventory").await, Some(StepStatus::Completed));
        assert_eq!(log.steps_for(&order_id).await.len(), 2);
    }

    #[tokio::test]
    async fn unknown_step_has_no_last_status() {
        let log = SagaLog::new();
        let order_id = OrderId::new("ord-1");

        assert_eq!(log.last_status_of(&order_id, "ProcessPayment").await, None);
    }
}
