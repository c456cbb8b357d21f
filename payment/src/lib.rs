//! A stateful stand-in for an external payment processor.
//!
//! `charge` and `refund` are keyed by order id, idempotent, and subject to a
//! configurable amount ceiling and random failure rate, enough surface for
//! both saga flows to exercise real compensation logic without an actual
//! payment network.

pub mod gateway;

pub use gateway::{PaymentError, PaymentGateway, PaymentStatus};
