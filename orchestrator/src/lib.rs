//! The orchestrated saga: a central coordinator drives the order, inventory,
//! and payment services through synchronous HTTP calls, tracks every step
//! in an append-only log, and compensates in reverse completion order on
//! failure.
//!
//! Contrast with `saga-choreography`, where the same four steps emerge from
//! event subscriptions instead of a single driver.

pub mod client;
pub mod coordinator;
pub mod saga_log;

pub use client::{ClientError, CreateOrderResponse, LineItemRequest, ReserveResponse, ServiceClient, ServiceEndpoints};
pub use coordinator::{SagaCoordinator, SagaCreationError, SagaOutcome};
pub use saga_log::{SagaLog, SagaStepEvent, StepStatus};
