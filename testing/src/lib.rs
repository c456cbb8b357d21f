//! # Saga Testing
//!
//! Shared test doubles for the saga demonstrator: a deterministic clock and
//! an in-memory event bus that speaks the same [`saga_core::EventBus`]
//! contract the AMQP-backed bus does, so choreography tests exercise real
//! subscribe/publish code paths without a broker.

use chrono::{DateTime, Utc};
use saga_core::environment::Clock;

/// Mock implementations of environment collaborators.
pub mod mocks {
    use super::{Clock, DateTime, Utc};
    use saga_core::event::Envelope;
    use saga_core::event_bus::{EventBus, EventBusError, EventStream};
    use std::collections::HashMap;
    use std::future::Future;
    use std::pin::Pin;
    use std::sync::Mutex;
    use tokio::sync::broadcast;

    /// A clock that always returns the same instant.
    ///
    /// ```
    /// use saga_testing::mocks::FixedClock;
    /// use saga_core::environment::Clock;
    /// use chrono::Utc;
    ///
    /// let clock = FixedClock::new(Utc::now());
    /// assert_eq!(clock.now(), clock.now());
    /// ```
    #[derive(Debug, Clone)]
    pub struct FixedClock {
        time: DateTime<Utc>,
    }

    impl FixedClock {
        /// Builds a clock fixed at `time`.
        #[must_use]
        pub const fn new(time: DateTime<Utc>) -> Self {
            Self { time }
        }
    }

    impl Clock for FixedClock {
        fn now(&self) -> DateTime<Utc> {
            self.time
        }
    }

    /// A [`FixedClock`] fixed at `2025-01-01T00:00:00Z`.
    ///
    /// # Panics
    ///
    /// Never, in practice: the timestamp is a compile-time literal.
    #[must_use]
    #[allow(clippy::expect_used)]
    pub fn test_clock() -> FixedClock {
        FixedClock::new(
            DateTime::parse_from_rfc3339("2025-01-01T00:00:00Z")
                .expect("hardcoded timestamp should always parse")
                .with_timezone(&Utc),
        )
    }

    /// An in-process stand-in for the `saga_events` topic exchange.
    ///
    /// Each `event_type` gets its own `tokio::sync::broadcast` channel,
    /// mirroring the real bus's per-routing-key queue: `publish` sends on the
    /// channel for `envelope.event_type`, `subscribe` hands back a fresh
    /// receiver turned into a `Stream`. Like the real bus this delivers
    /// at-least-once: a lagged receiver skips ahead rather than erroring the
    /// whole subscription, same as a slow consumer falling behind a durable
    /// queue.
    #[derive(Clone, Default)]
    pub struct InMemoryEventBus {
        topics: std::sync::Arc<Mutex<HashMap<String, broadcast::Sender<Envelope>>>>,
    }

    impl InMemoryEventBus {
        /// Builds an empty bus with no registered topics.
        #[must_use]
        pub fn new() -> Self {
            Self::default()
        }

        #[allow(clippy::unwrap_used)] // mutex is never held across an await point
        fn sender_for(&self, event_type: &str) -> broadcast::Sender<Envelope> {
            let mut topics = self.topics.lock().unwrap();
            topics
                .entry(event_type.to_string())
                .or_insert_with(|| broadcast::channel(256).0)
                .clone()
        }
    }

    impl EventBus for InMemoryEventBus {
        fn publish(
            &self,
            envelope: Envelope,
        ) -> Pin<Box<dyn Future<Output = Result<(), EventBusError>> + Send + '_>> {
            Box::pin(async move {
                let sender = self.sender_for(&envelope.event_type);
                // No subscribers yet is not an error -- nobody is listening for
                // this routing key right now, same as an unbound exchange.
                let _ = sender.send(envelope);
                Ok(())
            })
        }

        fn subscribe(
            &self,
            event_type: &str,
        ) -> Pin<Box<dyn Future<Output = Result<EventStream, EventBusError>> + Send + '_>> {
            let event_type = event_type.to_string();
            Box::pin(async move {
                let mut rx = self.sender_for(&event_type).subscribe();
                let stream = async_stream::stream! {
                    loop {
                        match rx.recv().await {
                            Ok(envelope) => yield Ok(envelope),
                            Err(broadcast::error::RecvError::Lagged(_)) => continue,
                            Err(broadcast::error::RecvError::Closed) => break,
                        }
                    }
                };
                Ok(Box::pin(stream) as EventStream)
            })
        }
    }
}

/// Placeholder for shared test builders (order requests, catalog fixtures).
pub mod helpers {}

/// `proptest` strategies for domain types, grown alongside the domain stores.
pub mod properties {}

pub use mocks::{test_clock, FixedClock, InMemoryEventBus};

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use futures::StreamExt;
    use saga_core::event_bus::EventBus;
    use saga_core::event::Envelope;

    #[test]
    fn fixed_clock_is_stable_across_calls() {
        let clock = test_clock();
        assert_eq!(clock.now(), clock.now());
    }

    #[tokio::test]
    async fn subscriber_receives_published_envelope() {
        let bus = InMemoryEventBus::new();
        let mut stream = bus.subscribe("OrderCreated").await.unwrap();

        let envelope = Envelope::new("order-1", Utc::now(), "OrderCreated", None, &serde_json::json!({}))
            .unwrap();
        bus.publish(envelope).await.unwrap();

        let received = stream.next().await.unwrap().unwrap();
        assert_eq!(received.order_id, "order-1");
    }

    #[tokio::test]
    async fn subscriber_does_not_receive_other_event_types() {
        let bus = InMemoryEventBus::new();
        let mut stream = bus.subscribe("OrderCreated").await.unwrap();

        let other = Envelope::new("order-2", Utc::now(), "InventoryReserved", None, &serde_json::json!({}))
            .unwrap();
        bus.publish(other).await.unwrap();

        let mine = Envelope::new("order-1", Utc::now(), "OrderCreated", None, &serde_json::json!({}))
            .unwrap();
        bus.publish(mine).await.unwrap();

        let received = stream.next().await.unwrap().unwrap();
        assert_eq!(received.order_id, "order-1");
    }
}
