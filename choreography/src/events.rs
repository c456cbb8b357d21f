//! Event type tags and payload shapes exchanged between participants.
//!
//! Every payload carries `customer_id` even where the literal event name
//! wouldn't obviously need it (e.g. `InventoryReservationFailed`), so that a
//! downstream participant never has to look anything up out-of-band just to
//! react to the event; each envelope is self-contained.

use saga_core::{CustomerId, Money, OrderId, ProductId};
use saga_domain::OrderItem;
use serde::{Deserialize, Serialize};

/// Routing key published when the order participant accepts a new order.
pub const ORDER_CREATED: &str = "OrderCreated";
/// Routing key published when the inventory participant reserves stock.
pub const INVENTORY_RESERVED: &str = "InventoryReserved";
/// Routing key published when the inventory participant can't reserve stock.
pub const INVENTORY_RESERVATION_FAILED: &str = "InventoryReservationFailed";
/// Routing key published when the payment participant completes a charge.
pub const PAYMENT_PROCESSED: &str = "PaymentProcessed";
/// Routing key published when the payment participant's charge fails.
pub const PAYMENT_FAILED: &str = "PaymentFailed";
/// Routing key published when a saga reaches a terminal `approved` status.
pub const ORDER_APPROVED: &str = "OrderApproved";
/// Routing key published when a saga reaches a terminal `rejected` status.
pub const ORDER_REJECTED: &str = "OrderRejected";
/// Routing key published to ask the inventory participant to release stock.
pub const REVERT_INVENTORY: &str = "RevertInventory";
/// Routing key published to ask the payment participant to refund a charge.
pub const REVERT_PAYMENT: &str = "RevertPayment";

/// Payload for [`ORDER_CREATED`].
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct OrderCreatedPayload {
    /// The customer who placed the order.
    pub customer_id: CustomerId,
    /// Line items, priced at creation time from the authoritative catalog.
    pub items: Vec<OrderItem>,
    /// `Σ item.price * item.quantity`, fixed for the rest of the saga.
    pub total: Money,
}

/// Payload for [`INVENTORY_RESERVED`].
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct InventoryReservedPayload {
    /// The customer who placed the order.
    pub customer_id: CustomerId,
    /// The items that were successfully reserved.
    pub items: Vec<OrderItem>,
    /// The order's fixed total, carried through from [`OrderCreatedPayload`].
    pub total: Money,
}

/// Payload for [`INVENTORY_RESERVATION_FAILED`].
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct InventoryReservationFailedPayload {
    /// The customer who placed the order.
    pub customer_id: CustomerId,
    /// The product that could not be reserved.
    pub product_id: ProductId,
    /// Human-readable failure reason.
    pub reason: String,
}

/// Payload for [`PAYMENT_PROCESSED`].
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PaymentProcessedPayload {
    /// The customer who placed the order.
    pub customer_id: CustomerId,
    /// The amount charged.
    pub total: Money,
}

/// Payload for [`PAYMENT_FAILED`].
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PaymentFailedPayload {
    /// The customer who placed the order.
    pub customer_id: CustomerId,
    /// The items to hand back to [`REVERT_INVENTORY`].
    pub items: Vec<OrderItem>,
    /// Human-readable failure reason.
    pub reason: String,
}

/// Payload for [`ORDER_APPROVED`] and [`ORDER_REJECTED`].
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct OrderOutcomePayload {
    /// The customer who placed the order.
    pub customer_id: CustomerId,
    /// Set on [`ORDER_REJECTED`]; absent on [`ORDER_APPROVED`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

/// Payload for [`REVERT_INVENTORY`].
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RevertInventoryPayload {
    /// The customer who placed the order.
    pub customer_id: CustomerId,
    /// The items whose stock should be released.
    pub items: Vec<OrderItem>,
    /// Why the revert was triggered.
    pub reason: String,
}

/// Payload for [`REVERT_PAYMENT`].
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RevertPaymentPayload {
    /// The customer who placed the order.
    pub customer_id: CustomerId,
    /// Why the revert was triggered.
    pub reason: String,
}

/// Converts `items` to the `(product_id, quantity)` pairs the catalog's
/// reserve/release operations take.
#[must_use]
pub fn quantities(items: &[OrderItem]) -> Vec<(ProductId, u32)> {
    items.iter().map(|item| (item.product_id.clone(), item.quantity)).collect()
}
