//! Shared Axum plumbing for the saga demonstrator's HTTP services.
//!
//! Every service binary (`auth-service`, `order-service`, `inventory-service`,
//! `payment-service`, `orchestrator-service`) wires its own `Router` against
//! its own store, but they all share: a typed [`AppError`] → HTTP mapping, a
//! `CorrelationId` extractor + middleware pair for distributed tracing, and a
//! liveness `/health` handler.
//!
//! # Request flow
//!
//! 1. HTTP request arrives at an Axum handler.
//! 2. Handler extracts a typed request body and a [`CorrelationId`].
//! 3. Handler builds an action and sends it through the service's `Store`.
//! 4. The store's effects run (domain mutation, event publish, outbound call).
//! 5. The handler maps the outcome to a JSON response or an [`AppError`].

#![forbid(unsafe_code)]
#![warn(missing_docs, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod error;
pub mod extractors;
pub mod handlers;
pub mod middleware;

pub use error::AppError;
pub use extractors::CorrelationId;
pub use handlers::health_check;
pub use middleware::{correlation_id_layer, CorrelationIdExt, CORRELATION_ID_HEADER};

/// Result type alias for web handlers.
pub type WebResult<T> = Result<T, AppError>;
