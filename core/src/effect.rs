//! Side effect descriptions.
//!
//! Effects describe work to be performed by the runtime. They are values, not
//! execution: a reducer returns a `Vec<Effect<Action>>` and the `Store` in
//! `saga-runtime` is the only thing that actually runs them.

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

/// Describes a side effect to be executed by the runtime.
///
/// `Action` is the reducer's action type; effects that produce a further action
/// feed it back into the same reducer (the "feedback loop").
#[allow(missing_docs)]
pub enum Effect<Action> {
    /// No-op effect.
    None,

    /// Run effects concurrently.
    Parallel(Vec<Effect<Action>>),

    /// Run effects one after another, in order.
    Sequential(Vec<Effect<Action>>),

    /// Dispatch an action after a delay (used for retry backoff and timeouts).
    Delay {
        /// How long to wait before dispatching.
        duration: Duration,
        /// Action to dispatch after the delay.
        action: Box<Action>,
    },

    /// Arbitrary async computation. `Some(action)` is fed back into the reducer.
    ///
    /// Event-bus publishes, gateway calls, and orchestrator HTTP requests are
    /// all expressed as a `Future` effect: the reducer captures whatever
    /// `Arc<dyn ...>` handle it needs from its `Environment` and builds the
    /// async block itself, so the runtime never needs to know about event
    /// buses, HTTP clients, or payment gateways.
    Future(Pin<Box<dyn Future<Output = Option<Action>> + Send>>),
}

impl<Action> std::fmt::Debug for Effect<Action>
where
    Action: std::fmt::Debug,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Effect::None => write!(f, "Effect::None"),
            Effect::Parallel(effects) => f.debug_tuple("Effect::Parallel").field(effects).finish(),
            Effect::Sequential(effects) => {
                f.debug_tuple("Effect::Sequential").field(effects).finish()
            },
            Effect::Delay { duration, action } => f
                .debug_struct("Effect::Delay")
                .field("duration", duration)
                .field("action", action)
                .finish(),
            Effect::Future(_) => write!(f, "Effect::Future(<future>)"),
        }
    }
}

impl<Action> Effect<Action> {
    /// Combine effects to run concurrently.
    #[must_use]
    pub const fn merge(effects: Vec<Effect<Action>>) -> Effect<Action> {
        Effect::Parallel(effects)
    }

    /// Combine effects to run in sequence.
    #[must_use]
    pub const fn chain(effects: Vec<Effect<Action>>) -> Effect<Action> {
        Effect::Sequential(effects)
    }

    /// Transform the action type this effect produces.
    ///
    /// Useful when composing a child reducer's effects into a parent's action type.
    pub fn map<B, F>(self, f: F) -> Effect<B>
    where
        F: Fn(Action) -> B + Send + Sync + 'static + Clone,
        Action: 'static,
        B: Send + 'static,
    {
        match self {
            Effect::None => Effect::None,
            Effect::Parallel(effects) => {
                Effect::Parallel(effects.into_iter().map(|e| e.map(f.clone())).collect())
            },
            Effect::Sequential(effects) => {
                Effect::Sequential(effects.into_iter().map(|e| e.map(f.clone())).collect())
            },
            Effect::Delay { duration, action } => Effect::Delay {
                duration,
                action: Box::new(f(*action)),
            },
            Effect::Future(fut) => Effect::Future(Box::pin(async move { fut.await.map(f) })),
        }
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    enum TestAction {
        A,
        B,
    }

    #[derive(Debug, Clone, PartialEq)]
    enum MappedAction {
        Mapped(TestAction),
    }

    #[test]
    fn merge_produces_parallel() {
        let merged = Effect::merge(vec![Effect::<TestAction>::None, Effect::None]);
        match merged {
            Effect::Parallel(effects) => assert_eq!(effects.len(), 2),
            _ => panic!("expected Parallel"),
        }
    }

    #[test]
    fn chain_produces_sequential() {
        let chained = Effect::chain(vec![Effect::<TestAction>::None, Effect::None]);
        match chained {
            Effect::Sequential(effects) => assert_eq!(effects.len(), 2),
            _ => panic!("expected Sequential"),
        }
    }

    #[test]
    fn map_delay_transforms_action() {
        let effect = Effect::Delay {
            duration: Duration::from_secs(1),
            action: Box::new(TestAction::A),
        };
        let mapped: Effect<MappedAction> = effect.map(MappedAction::Mapped);
        match mapped {
            Effect::Delay { action, .. } => assert_eq!(*action, MappedAction::Mapped(TestAction::A)),
            _ => panic!("expected Delay"),
        }
    }

    #[tokio::test]
    async fn map_future_transforms_resolved_action() {
        let effect: Effect<TestAction> = Effect::Future(Box::pin(async { Some(TestAction::B) }));
        let mapped: Effect<MappedAction> = effect.map(MappedAction::Mapped);
        match mapped {
            Effect::Future(fut) => assert_eq!(fut.await, Some(MappedAction::Mapped(TestAction::B))),
            _ => panic!("expected Future"),
        }
    }
}
