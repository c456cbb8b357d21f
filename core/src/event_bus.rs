//! The event bus abstraction the choreographed saga is built on.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────┐  publish(envelope)   ┌────────────────────┐
//! │ Reducer  │ ───────────────────► │ saga_events exchange│
//! └──────────┘                      │   (topic, durable)  │
//!                                   └──────────┬──────────┘
//!                                              │ routing key = event type
//!                  ┌───────────────────────────┼───────────────────────────┐
//!                  ▼                           ▼                           ▼
//!         ephemeral queue             ephemeral queue             ephemeral queue
//!         (inventory participant)     (payment participant)       (order participant)
//! ```
//!
//! # Delivery semantics
//!
//! At-least-once per subscribed type; no ordering across distinct publishers;
//! FIFO within a single publisher → queue path. Handlers must be idempotent.
//!
//! # Dyn compatibility
//!
//! This trait returns `Pin<Box<dyn Future>>` explicitly instead of using
//! `async fn` so it can be used as `Arc<dyn EventBus>` from reducer
//! environments, which must be `Clone` and object-safe.

use crate::event::Envelope;
use futures::Stream;
use std::future::Future;
use std::pin::Pin;
use thiserror::Error;

/// Errors surfaced by an `EventBus` implementation.
#[derive(Error, Debug, Clone)]
pub enum EventBusError {
    /// The broker did not acknowledge a publish within the configured deadline.
    #[error("publish to '{event_type}' timed out")]
    PublishTimeout {
        /// The event type (routing key) that timed out.
        event_type: String,
    },

    /// The broker connection could not be established or was lost.
    #[error("event bus connection error: {0}")]
    Connection(String),

    /// Declaring the exchange, queue, or binding failed.
    #[error("event bus topology error: {0}")]
    Topology(String),

    /// A received message's envelope could not be decoded.
    #[error("failed to decode envelope: {0}")]
    Decode(String),
}

/// A stream of envelopes delivered to a subscription.
pub type EventStream = Pin<Box<dyn Stream<Item = Result<Envelope, EventBusError>> + Send>>;

/// Publish/subscribe contract over the `saga_events` topic exchange.
///
/// Implementations must be `Send + Sync` so they can live behind an `Arc` in
/// a reducer `Environment` and be shared across concurrently-running effects.
pub trait EventBus: Send + Sync {
    /// Publishes `envelope` under the routing key `envelope.event_type`.
    ///
    /// # Errors
    ///
    /// Returns [`EventBusError::PublishTimeout`] if the broker does not
    /// acknowledge within the configured publish deadline.
    fn publish(
        &self,
        envelope: Envelope,
    ) -> Pin<Box<dyn Future<Output = Result<(), EventBusError>> + Send + '_>>;

    /// Binds a fresh ephemeral, auto-deleted queue to `event_type` and returns
    /// a stream of decoded envelopes delivered to it.
    ///
    /// # Errors
    ///
    /// Returns [`EventBusError::Topology`] if the queue or binding cannot be
    /// declared.
    fn subscribe(
        &self,
        event_type: &str,
    ) -> Pin<Box<dyn Future<Output = Result<EventStream, EventBusError>> + Send + '_>>;
}
