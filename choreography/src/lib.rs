//! Choreographed saga participants.
//!
//! Each participant is a [`saga_core::Reducer`] whose real state lives in the
//! domain store or gateway it holds in its `Environment` rather than in its
//! own `State`: all three `*State` types here are zero-sized markers.
//! A service binary subscribes its participant's reducer to the relevant bus
//! topics and lets published events drive the next participant in turn.

pub mod events;
pub mod inventory_participant;
pub mod order_participant;
pub mod payment_participant;

pub use events::{
    InventoryReservationFailedPayload, InventoryReservedPayload, OrderCreatedPayload,
    OrderOutcomePayload, PaymentFailedPayload, PaymentProcessedPayload, RevertInventoryPayload,
    RevertPaymentPayload, INVENTORY_RESERVATION_FAILED, INVENTORY_RESERVED, ORDER_APPROVED,
    ORDER_CREATED, ORDER_REJECTED, PAYMENT_FAILED, PAYMENT_PROCESSED, REVERT_INVENTORY,
    REVERT_PAYMENT,
};
pub use inventory_participant::{
    InventoryAction, InventoryParticipantEnvironment, InventoryParticipantReducer,
    InventoryParticipantState,
};
pub use order_participant::{
    OrderAction, OrderParticipantEnvironment, OrderParticipantReducer, OrderParticipantState,
};
pub use payment_participant::{
    PaymentAction, PaymentParticipantEnvironment, PaymentParticipantReducer,
    PaymentParticipantState,
};
