//! The payment gateway: a stand-in for an external payment processor.

use saga_core::{CustomerId, Money, OrderId};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

const DEFAULT_LIMIT: f64 = 2000.0;
const DEFAULT_FAILURE_RATE: f64 = 0.15;
const REFUND_FAILURE_RATE: f64 = 0.05;
const MIN_LATENCY_MS: u64 = 20;
const MAX_LATENCY_MS: u64 = 120;

const DECLINE_REASONS: &[&str] =
    &["insufficient funds", "card declined by issuer", "gateway timeout", "risk check failed"];

fn random_decline_reason() -> &'static str {
    let index = rand::Rng::gen_range(&mut rand::thread_rng(), 0..DECLINE_REASONS.len());
    DECLINE_REASONS[index]
}

/// Where a transaction sits in the gateway's internal state machine.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    /// `charge` is in flight (never observed at rest; included for completeness).
    Pending,
    /// `charge` succeeded.
    Completed,
    /// `charge` was declined or exceeded the configured limit.
    Failed,
    /// `refund` succeeded after a `Completed` charge.
    Refunded,
    /// `refund` was attempted against a `Completed` charge and failed.
    FailedRefund,
}

/// Failure modes from `charge` / `refund`.
#[derive(Debug, Clone, thiserror::Error)]
pub enum PaymentError {
    /// The requested amount is above the gateway's configured ceiling.
    #[error("amount {amount} exceeds gateway limit {limit}")]
    AmountExceedsLimit {
        /// The amount that was rejected.
        amount: Money,
        /// The configured ceiling.
        limit: Money,
    },
    /// The gateway's randomized failure check declined the charge or refund.
    #[error("payment declined: {reason}")]
    Declined {
        /// A canned, human-readable decline reason.
        reason: &'static str,
    },
    /// `order_id` or `customer_id` was empty.
    #[error("invalid payment request: {0}")]
    Validation(String),
}

/// A stateful external-system stand-in: `charge` and `refund`, keyed by
/// order id, with a configurable amount ceiling and random failure rate.
///
/// The transaction map is process-local and guarded by a single lock, per
/// the "one exclusive writer per store" discipline used throughout this
/// workspace; concurrent `charge`/`refund` calls against the same order id
/// are serialized.
#[derive(Clone)]
pub struct PaymentGateway {
    transactions: Arc<RwLock<HashMap<OrderId, PaymentStatus>>>,
    limit: Money,
    failure_rate: f64,
}

impl PaymentGateway {
    /// Builds a gateway with an explicit limit and failure rate.
    #[must_use]
    pub fn new(limit: Money, failure_rate: f64) -> Self {
        Self { transactions: Arc::new(RwLock::new(HashMap::new())), limit, failure_rate }
    }

    /// Builds a gateway from `PAYMENT_GATEWAY_LIMIT` / `PAYMENT_GATEWAY_FAILURE_RATE`,
    /// falling back to the documented defaults (2000.0, 0.15) for any variable
    /// that is unset or unparsable.
    #[must_use]
    pub fn from_env() -> Self {
        let limit = std::env::var("PAYMENT_GATEWAY_LIMIT")
            .ok()
            .and_then(|v| v.parse::<f64>().ok())
            .unwrap_or(DEFAULT_LIMIT);
        let failure_rate = std::env::var("PAYMENT_GATEWAY_FAILURE_RATE")
            .ok()
            .and_then(|v| v.parse::<f64>().ok())
            .unwrap_or(DEFAULT_FAILURE_RATE);
        Self::new(Money::from_f64(limit), failure_rate)
    }

    /// Returns the transaction's current status, if any charge has been
    /// attempted for `order_id`.
    pub async fn status(&self, order_id: &OrderId) -> Option<PaymentStatus> {
        self.transactions.read().await.get(order_id).copied()
    }

    /// Charges `amount` against `order_id` on behalf of `customer_id`.
    ///
    /// Idempotent: calling `charge` again for an order whose transaction is
    /// already `Completed` returns `Ok(())` without re-running the failure
    /// check or simulated latency.
    ///
    /// # Errors
    ///
    /// Returns [`PaymentError::Validation`] for an empty `order_id` or
    /// `customer_id`, [`PaymentError::AmountExceedsLimit`] if `amount`
    /// exceeds the configured ceiling, or [`PaymentError::Declined`] if the
    /// randomized failure check trips.
    pub async fn charge(
        &self,
        order_id: &OrderId,
        customer_id: &CustomerId,
        amount: Money,
    ) -> Result<(), PaymentError> {
        if order_id.as_str().is_empty() || customer_id.as_str().is_empty() {
            return Err(PaymentError::Validation("order_id and customer_id must not be empty".into()));
        }

        {
            let transactions = self.transactions.read().await;
            if transactions.get(order_id) == Some(&PaymentStatus::Completed) {
                return Ok(());
            }
        }

        self.transactions.write().await.insert(order_id.clone(), PaymentStatus::Pending);
        simulate_latency().await;

        if amount > self.limit {
            self.transactions.write().await.insert(order_id.clone(), PaymentStatus::Failed);
            metrics::counter!("payment.charge.failed").increment(1);
            return Err(PaymentError::AmountExceedsLimit { amount, limit: self.limit });
        }

        if trips(self.failure_rate) {
            self.transactions.write().await.insert(order_id.clone(), PaymentStatus::Failed);
            metrics::counter!("payment.charge.failed").increment(1);
            return Err(PaymentError::Declined { reason: random_decline_reason() });
        }

        self.transactions.write().await.insert(order_id.clone(), PaymentStatus::Completed);
        metrics::counter!("payment.charge.completed").increment(1);
        Ok(())
    }

    /// Refunds a previously completed charge for `order_id`.
    ///
    /// Idempotent and no-op-safe: refunding an order whose transaction is
    /// not currently `Completed` succeeds trivially (per the "re-invoking
    /// `refund` on a non-completed order is a no-op" guarantee), since a
    /// compensation may legitimately race with, or be re-driven after, a
    /// charge that never succeeded.
    ///
    /// # Errors
    ///
    /// Returns [`PaymentError::Declined`] if the refund itself is declined
    /// by the randomized failure check; the transaction is left
    /// `FailedRefund` for operator reconciliation.
    pub async fn refund(&self, order_id: &OrderId) -> Result<(), PaymentError> {
        {
            let transactions = self.transactions.read().await;
            if transactions.get(order_id) != Some(&PaymentStatus::Completed) {
                return Ok(());
            }
        }

        simulate_latency().await;

        if trips(REFUND_FAILURE_RATE) {
            self.transactions.write().await.insert(order_id.clone(), PaymentStatus::FailedRefund);
            metrics::counter!("payment.refund.failed").increment(1);
            return Err(PaymentError::Declined { reason: random_decline_reason() });
        }

        self.transactions.write().await.insert(order_id.clone(), PaymentStatus::Refunded);
        metrics::counter!("payment.refund.completed").increment(1);
        Ok(())
    }
}

async fn simulate_latency() {
    let millis = rand::Rng::gen_range(&mut rand::thread_rng(), MIN_LATENCY_MS..=MAX_LATENCY_MS);
    tokio::time::sleep(Duration::from_millis(millis)).await;
}

fn trips(failure_rate: f64) -> bool {
    failure_rate > 0.0 && rand::Rng::gen::<f64>(&mut rand::thread_rng()) < failure_rate
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn reliable_gateway() -> PaymentGateway {
        PaymentGateway::new(Money::from_cents(200_000), 0.0)
    }

    fn customer() -> CustomerId {
        CustomerId::new("cust-1")
    }

    #[tokio::test]
    async fn charge_succeeds_under_limit_with_no_failures() {
        let gateway = reliable_gateway();
        let order_id = OrderId::new("ord-1");

        gateway.charge(&order_id, &customer(), Money::from_cents(1990)).await.unwrap();

        assert_eq!(gateway.status(&order_id).await, Some(PaymentStatus::Completed));
    }

    #[tokio::test]
    async fn charge_rejects_empty_identifiers() {
        let gateway = reliable_gateway();

        let result = gateway.charge(&OrderId::new(""), &customer(), Money::from_cents(1990)).await;

        assert!(matches!(result, Err(PaymentError::Validation(_))));
    }

    #[tokio::test]
    async fn charge_rejects_amount_over_limit() {
        let gateway = PaymentGateway::new(Money::from_cents(1000), 0.0);
        let order_id = OrderId::new("ord-1");

        let result = gateway.charge(&order_id, &customer(), Money::from_cents(5000)).await;

        assert!(matches!(result, Err(PaymentError::AmountExceedsLimit { .. })));
        assert_eq!(gateway.status(&order_id).await, Some(PaymentStatus::Failed));
    }

    #[tokio::test]
    async fn charge_is_idempotent_once_completed() {
        let gateway = reliable_gateway();
        let order_id = OrderId::new("ord-1");

        gateway.charge(&order_id, &customer(), Money::from_cents(1990)).await.unwrap();
        gateway.charge(&order_id, &customer(), Money::from_cents(1990)).await.unwrap();

        assert_eq!(gateway.status(&order_id).await, Some(PaymentStatus::Completed));
    }

    #[tokio::test]
    async fn refund_on_non_completed_order_is_a_no_op() {
        let gateway = reliable_gateway();
        let order_id = OrderId::new("never-charged");

        gateway.refund(&order_id).await.unwrap();

        assert_eq!(gateway.status(&order_id).await, None);
    }

    #[tokio::test]
    async fn refund_after_successful_charge_marks_refunded() {
        let gateway = reliable_gateway();
        let order_id = OrderId::new("ord-1");
        gateway.charge(&order_id, &customer(), Money::from_cents(1990)).await.unwrap();

        gateway.refund(&order_id).await.unwrap();

        assert_eq!(gateway.status(&order_id).await, Some(PaymentStatus::Refunded));
    }

    #[test]
    fn from_env_falls_back_to_documented_defaults() {
        std::env::remove_var("PAYMENT_GATEWAY_LIMIT");
        std::env::remove_var("PAYMENT_GATEWAY_FAILURE_RATE");
        let gateway = PaymentGateway::from_env();
        assert_eq!(gateway.limit, Money::from_f64(DEFAULT_LIMIT));
        assert!((gateway.failure_rate - DEFAULT_FAILURE_RATE).abs() < f64::EPSILON);
    }
}
