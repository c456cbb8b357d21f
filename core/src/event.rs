//! The event envelope exchanged over the event bus.
//!
//! Every choreographed-saga event travels as an [`Envelope`]: a small header
//! (order id, timestamp, type tag, optional human-readable details) wrapping a
//! JSON payload whose shape is selected by `event_type`. Keeping the payload as
//! `serde_json::Value` on the wire (rather than a single closed enum) mirrors
//! the broker's own view of a message (it does not know about Rust types,
//! only bytes and a routing key), while `decode`/`encode` give each
//! participant a typed view of the payload it actually cares about.

use chrono::{DateTime, Utc};
use serde::{de::DeserializeOwned, Serialize};
use thiserror::Error;

/// Errors that can occur while encoding or decoding an envelope payload.
#[derive(Error, Debug, Clone)]
pub enum EventError {
    /// The payload could not be serialized to JSON.
    #[error("failed to encode event payload: {0}")]
    Encode(String),

    /// The payload could not be decoded into the requested type.
    #[error("failed to decode event payload as {expected}: {reason}")]
    Decode {
        /// The Rust type the caller tried to decode into.
        expected: &'static str,
        /// The underlying decode error.
        reason: String,
    },
}

/// An event published on the `saga_events` topic exchange.
///
/// `event_type` doubles as the AMQP routing key (§6): subscribers bind a queue
/// to the exchange using this string, so it must be stable across releases.
#[derive(Clone, Debug, Serialize, serde::Deserialize)]
pub struct Envelope {
    /// The order this event concerns. Every event in this system is scoped to
    /// exactly one order, even inventory and payment events.
    pub order_id: String,

    /// When the event was produced.
    pub timestamp: DateTime<Utc>,

    /// The event type tag, e.g. `"OrderCreated"`. Also used as the routing key.
    #[serde(rename = "type")]
    pub event_type: String,

    /// Optional human-readable detail, surfaced in logs and rejection reasons.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,

    /// The type-specific payload.
    pub payload: serde_json::Value,
}

impl Envelope {
    /// Builds an envelope by serializing `payload` to JSON.
    ///
    /// # Errors
    ///
    /// Returns [`EventError::Encode`] if `payload` cannot be serialized.
    pub fn new<T: Serialize>(
        order_id: impl Into<String>,
        timestamp: DateTime<Utc>,
        event_type: impl Into<String>,
        details: Option<String>,
        payload: &T,
    ) -> Result<Self, EventError> {
        let payload = serde_json::to_value(payload).map_err(|e| EventError::Encode(e.to_string()))?;
        Ok(Self {
            order_id: order_id.into(),
            timestamp,
            event_type: event_type.into(),
            details,
            payload,
        })
    }

    /// Decodes the payload into a concrete type.
    ///
    /// # Errors
    ///
    /// Returns [`EventError::Decode`] if the payload's shape does not match `T`.
    pub fn decode<T: DeserializeOwned>(&self) -> Result<T, EventError> {
        serde_json::from_value(self.payload.clone()).map_err(|e| EventError::Decode {
            expected: std::any::type_name::<T>(),
            reason: e.to_string(),
        })
    }
}
