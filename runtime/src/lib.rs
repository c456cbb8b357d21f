//! # Saga Runtime
//!
//! The runtime that drives a [`saga_core::Reducer`]: a [`Store`] owns state
//! behind a lock, calls the reducer synchronously under that lock, and then
//! executes the effects the reducer returned.
//!
//! ## Core components
//!
//! - **Store**: owns state + reducer + environment, exposes `send`/`state`.
//! - **Effect executor**: walks an [`saga_core::Effect`] tree and feeds any
//!   produced action back into the store (the "feedback loop").
//! - **RetryPolicy** / **CircuitBreaker**: utilities the environment's
//!   collaborators (HTTP clients, the event bus, the payment gateway client)
//!   use to wrap their own calls; the `Store` itself does not retry effects.
//!
//! ## Example
//!
//! ```ignore
//! use saga_runtime::Store;
//!
//! let store = Store::new(initial_state, my_reducer, environment);
//! let handle = store.send(Action::DoSomething).await;
//! handle.wait_with_timeout(Duration::from_secs(5)).await.ok();
//! let value = store.state(|s| s.some_field.clone()).await;
//! ```

use saga_core::{Effect, Reducer};
use std::sync::Arc;
use tokio::sync::RwLock;

/// Errors surfaced by the store runtime itself (not by reducers or effects,
/// which report through their own domain error types).
pub mod error {
    /// Failure modes internal to [`crate::Store`].
    #[derive(Debug, thiserror::Error)]
    pub enum StoreError {
        /// An effect's future resolved to an error the caller chose to surface.
        #[error("effect failed: {0}")]
        EffectFailed(String),

        /// A spawned effect task panicked or was cancelled.
        #[error("effect task join error: {0}")]
        TaskJoinError(#[from] tokio::task::JoinError),

        /// [`crate::Store::send_and_wait_for`] did not observe a matching action
        /// before its deadline.
        #[error("timed out after {after:?} waiting for a matching action")]
        Timeout {
            /// The deadline that elapsed.
            after: std::time::Duration,
        },
    }
}

pub use error::StoreError;

use std::time::Duration;

/// Exponential backoff with jitter, used by collaborators wrapping outbound
/// calls (HTTP to a peer service, a broker publish, a gateway charge).
///
/// `delay_for_attempt(n) = min(initial * multiplier^n, max_delay) * U(0.5, 1.0)`
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    max_attempts: u32,
    initial_delay: Duration,
    max_delay: Duration,
    backoff_multiplier: f64,
}

impl RetryPolicy {
    /// Defaults: 5 attempts, 1s initial delay, 32s cap, 2x multiplier.
    #[must_use]
    pub fn new() -> Self {
        Self {
            max_attempts: 5,
            initial_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(32),
            backoff_multiplier: 2.0,
        }
    }

    /// Saga-coordinator default: 3 attempts, 500ms initial delay, doubling.
    #[must_use]
    pub fn saga_default() -> Self {
        Self {
            max_attempts: 3,
            initial_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(10),
            backoff_multiplier: 2.0,
        }
    }

    /// Set the maximum number of attempts (including the first).
    #[must_use]
    pub const fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    /// Set the initial backoff delay.
    #[must_use]
    pub const fn with_initial_delay(mut self, initial_delay: Duration) -> Self {
        self.initial_delay = initial_delay;
        self
    }

    /// Set the backoff ceiling.
    #[must_use]
    pub const fn with_max_delay(mut self, max_delay: Duration) -> Self {
        self.max_delay = max_delay;
        self
    }

    /// Set the multiplier applied to the delay each attempt.
    #[must_use]
    pub const fn with_backoff_multiplier(mut self, backoff_multiplier: f64) -> Self {
        self.backoff_multiplier = backoff_multiplier;
        self
    }

    /// Maximum attempts configured.
    #[must_use]
    pub const fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Whether another attempt should be made given the attempt count already made.
    #[must_use]
    pub const fn should_retry(&self, attempt: u32) -> bool {
        attempt < self.max_attempts
    }

    /// Delay to sleep before the given (zero-indexed) retry attempt.
    #[must_use]
    #[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let exp = self.backoff_multiplier.powi(attempt as i32);
        let scaled = self.initial_delay.as_secs_f64() * exp;
        let capped = scaled.min(self.max_delay.as_secs_f64());
        let jitter = rand::Rng::gen_range(&mut rand::thread_rng(), 0.5..=1.0);
        Duration::from_secs_f64(capped * jitter)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new()
    }
}

/// Runs `f`, retrying according to `policy` until it succeeds or attempts
/// are exhausted. Used by HTTP clients, the bus publisher, and the payment
/// gateway client, anywhere a `TransientIO`-class failure should be retried
/// before surfacing to the caller.
///
/// # Errors
///
/// Returns the last error `f` produced once `policy` says to stop retrying.
pub async fn retry_with_policy<F, Fut, T, Err>(
    policy: &RetryPolicy,
    operation_name: &str,
    mut f: F,
) -> Result<T, Err>
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = Result<T, Err>>,
    Err: std::fmt::Display,
{
    let mut attempt = 0;
    loop {
        match f().await {
            Ok(result) => {
                if attempt > 0 {
                    metrics::counter!(
                        "store.retry.success",
                        "operation" => operation_name.to_string()
                    )
                    .increment(1);
                }
                return Ok(result);
            },
            Err(error) => {
                if !policy.should_retry(attempt + 1) {
                    metrics::counter!(
                        "store.retry.exhausted",
                        "operation" => operation_name.to_string()
                    )
                    .increment(1);
                    tracing::error!(operation = operation_name, %error, "retries exhausted");
                    return Err(error);
                }
                let delay = policy.delay_for_attempt(attempt);
                tracing::warn!(operation = operation_name, attempt, ?delay, %error, "retrying");
                tokio::time::sleep(delay).await;
                attempt += 1;
            },
        }
    }
}

use std::sync::atomic::{AtomicU64, AtomicU8, AtomicUsize, Ordering};

/// A circuit breaker's observable state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CircuitState {
    /// Calls pass through; failures accumulate toward the threshold.
    Closed,
    /// Calls are rejected immediately until `timeout` elapses.
    Open,
    /// A single probe window; success closes the circuit, failure reopens it.
    HalfOpen,
}

/// Error returned when a call is rejected because the circuit is open.
#[derive(Debug, Clone, thiserror::Error)]
pub enum CircuitBreakerError {
    /// The circuit is open; the call was not attempted.
    #[error("circuit breaker is open")]
    Open,
}

/// Wraps calls to a flaky collaborator (the payment gateway, a peer service)
/// with a closed/open/half-open state machine.
///
/// Transitions: `Closed` → `Open` after `failure_threshold` consecutive
/// failures; `Open` → `HalfOpen` after `timeout`; `HalfOpen` → `Closed` after
/// `success_threshold` consecutive successes; `HalfOpen` → `Open` on any
/// failure.
pub struct CircuitBreaker {
    state: Arc<AtomicU8>,
    failure_count: Arc<AtomicUsize>,
    success_count: Arc<AtomicUsize>,
    opened_at: Arc<AtomicU64>,
    failure_threshold: usize,
    timeout: Duration,
    success_threshold: usize,
}

impl CircuitBreaker {
    /// Defaults: 5-failure threshold, 60s open timeout, 2 successes to close.
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: Arc::new(AtomicU8::new(CircuitState::Closed as u8)),
            failure_count: Arc::new(AtomicUsize::new(0)),
            success_count: Arc::new(AtomicUsize::new(0)),
            opened_at: Arc::new(AtomicU64::new(0)),
            failure_threshold: 5,
            timeout: Duration::from_secs(60),
            success_threshold: 2,
        }
    }

    /// Set the consecutive-failure threshold that opens the circuit.
    #[must_use]
    pub const fn with_failure_threshold(mut self, threshold: usize) -> Self {
        self.failure_threshold = threshold;
        self
    }

    /// Set how long the circuit stays open before probing.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the consecutive-success threshold that closes the circuit from half-open.
    #[must_use]
    pub const fn with_success_threshold(mut self, threshold: usize) -> Self {
        self.success_threshold = threshold;
        self
    }

    /// Current state.
    #[must_use]
    pub fn state(&self) -> CircuitState {
        match self.state.load(Ordering::Acquire) {
            0 => CircuitState::Closed,
            1 => CircuitState::Open,
            _ => CircuitState::HalfOpen,
        }
    }

    fn check(&self) -> Result<(), CircuitBreakerError> {
        match self.state() {
            CircuitState::Closed | CircuitState::HalfOpen => Ok(()),
            CircuitState::Open => {
                let opened_at_nanos = self.opened_at.load(Ordering::Acquire);
                let now_nanos = now_nanos();
                let elapsed = Duration::from_nanos(now_nanos.saturating_sub(opened_at_nanos));
                if elapsed >= self.timeout {
                    self.state.store(CircuitState::HalfOpen as u8, Ordering::Release);
                    self.success_count.store(0, Ordering::Release);
                    tracing::info!("circuit breaker: open -> half_open");
                    Ok(())
                } else {
                    Err(CircuitBreakerError::Open)
                }
            },
        }
    }

    /// Record a successful call.
    pub fn record_success(&self) {
        match self.state() {
            CircuitState::Closed => self.failure_count.store(0, Ordering::Release),
            CircuitState::HalfOpen => {
                let successes = self.success_count.fetch_add(1, Ordering::AcqRel) + 1;
                if successes >= self.success_threshold {
                    self.state.store(CircuitState::Closed as u8, Ordering::Release);
                    self.failure_count.store(0, Ordering::Release);
                    self.success_count.store(0, Ordering::Release);
                    tracing::info!("circuit breaker: half_open -> closed");
                }
            },
            CircuitState::Open => {},
        }
    }

    /// Record a failed call.
    pub fn record_failure(&self) {
        match self.state() {
            CircuitState::Closed => {
                let failures = self.failure_count.fetch_add(1, Ordering::AcqRel) + 1;
                if failures >= self.failure_threshold {
                    self.state.store(CircuitState::Open as u8, Ordering::Release);
                    self.opened_at.store(now_nanos(), Ordering::Release);
                    tracing::warn!(failures, threshold = self.failure_threshold, "circuit breaker: closed -> open");
                }
            },
            CircuitState::HalfOpen => {
                self.state.store(CircuitState::Open as u8, Ordering::Release);
                self.success_count.store(0, Ordering::Release);
                self.opened_at.store(now_nanos(), Ordering::Release);
                tracing::warn!("circuit breaker: half_open -> open");
            },
            CircuitState::Open => {},
        }
    }

    /// Runs `f` if the circuit allows it, recording the outcome.
    ///
    /// # Errors
    ///
    /// Returns `Either::Left(CircuitBreakerError::Open)` if the circuit
    /// rejected the call, or `Either::Right(error)` if `f` itself failed.
    pub async fn call<F, Fut, T, E>(&self, f: F) -> Result<T, Either<CircuitBreakerError, E>>
    where
        F: FnOnce() -> Fut,
        Fut: std::future::Future<Output = Result<T, E>>,
    {
        self.check().map_err(Either::Left)?;
        match f().await {
            Ok(result) => {
                self.record_success();
                Ok(result)
            },
            Err(error) => {
                self.record_failure();
                Err(Either::Right(error))
            },
        }
    }
}

fn now_nanos() -> u64 {
    u64::try_from(
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap_or(Duration::ZERO)
            .as_nanos(),
    )
    .unwrap_or(u64::MAX)
}

impl Clone for CircuitBreaker {
    fn clone(&self) -> Self {
        Self {
            state: Arc::clone(&self.state),
            failure_count: Arc::clone(&self.failure_count),
            success_count: Arc::clone(&self.success_count),
            opened_at: Arc::clone(&self.opened_at),
            failure_threshold: self.failure_threshold,
            timeout: self.timeout,
            success_threshold: self.success_threshold,
        }
    }
}

impl Default for CircuitBreaker {
    fn default() -> Self {
        Self::new()
    }
}

/// Either one error type or another; used by [`CircuitBreaker::call`] to
/// distinguish "circuit open" from "the wrapped call itself failed".
#[derive(Debug)]
pub enum Either<L, R> {
    /// The circuit breaker rejected the call.
    Left(L),
    /// The wrapped call failed.
    Right(R),
}

impl<L: std::fmt::Display, R: std::fmt::Display> std::fmt::Display for Either<L, R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Either::Left(l) => write!(f, "{l}"),
            Either::Right(r) => write!(f, "{r}"),
        }
    }
}

impl<L: std::error::Error, R: std::error::Error> std::error::Error for Either<L, R> {}

use std::sync::Mutex;
use tokio::sync::{broadcast, watch};

/// Controls how an [`EffectHandle`] decides "all effects are done".
#[derive(Debug, Clone)]
enum TrackingMode {
    /// Track only the effects spawned directly by this action.
    Direct,
}

/// Returned by [`Store::send`]; lets a caller wait for the effects triggered
/// by that action to finish running.
#[derive(Clone)]
pub struct EffectHandle {
    mode: TrackingMode,
    effects: Arc<AtomicUsize>,
    completion: watch::Receiver<()>,
}

impl EffectHandle {
    fn new() -> (Self, EffectTracking) {
        let counter = Arc::new(AtomicUsize::new(0));
        let (tx, rx) = watch::channel(());
        let handle = Self { mode: TrackingMode::Direct, effects: Arc::clone(&counter), completion: rx };
        let tracking = EffectTracking { counter, notifier: tx };
        (handle, tracking)
    }

    /// A handle that is already complete; useful as a loop seed.
    #[must_use]
    pub fn completed() -> Self {
        let (tx, rx) = watch::channel(());
        let _ = tx.send(());
        Self { mode: TrackingMode::Direct, effects: Arc::new(AtomicUsize::new(0)), completion: rx }
    }

    /// Waits until every effect tracked by this handle has completed.
    pub async fn wait(&mut self) {
        while self.effects.load(Ordering::SeqCst) > 0 {
            let _ = self.completion.changed().await;
        }
    }

    /// Waits as in [`Self::wait`], bounded by `timeout`.
    ///
    /// # Errors
    ///
    /// Returns `Err(())` if `timeout` elapses first.
    pub async fn wait_with_timeout(&mut self, timeout: Duration) -> Result<(), ()> {
        tokio::time::timeout(timeout, self.wait()).await.map_err(|_| ())
    }
}

impl std::fmt::Debug for EffectHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EffectHandle")
            .field("mode", &self.mode)
            .field("pending_effects", &self.effects.load(Ordering::SeqCst))
            .finish_non_exhaustive()
    }
}

#[derive(Clone)]
struct EffectTracking {
    counter: Arc<AtomicUsize>,
    notifier: watch::Sender<()>,
}

impl EffectTracking {
    fn increment(&self) {
        self.counter.fetch_add(1, Ordering::SeqCst);
    }

    fn decrement(&self) {
        if self.counter.fetch_sub(1, Ordering::SeqCst) == 1 {
            let _ = self.notifier.send(());
        }
    }
}

/// RAII guard that decrements the effect counter on drop, so a panicking
/// effect task still unblocks waiters.
struct DecrementGuard(EffectTracking);

impl Drop for DecrementGuard {
    fn drop(&mut self) {
        self.0.decrement();
    }
}

/// The runtime coordinator for a single reducer.
///
/// Owns `S` behind an async `RwLock`, holds the reducer and its injected
/// `E`nvironment, and executes whatever [`Effect`]s the reducer returns.
/// Cloning a `Store` is cheap: it clones the `Arc<RwLock<S>>` and the
/// broadcast sender, so every clone observes the same state and the same
/// action stream.
pub struct Store<S, A, E, R>
where
    R: Reducer<State = S, Action = A, Environment = E>,
{
    state: Arc<RwLock<S>>,
    reducer: R,
    environment: E,
    action_tx: broadcast::Sender<A>,
}

impl<S, A, E, R> Store<S, A, E, R>
where
    R: Reducer<State = S, Action = A, Environment = E> + Send + Sync + 'static,
    A: Send + Clone + 'static,
    S: Send + Sync + 'static,
    E: Send + Sync + 'static,
{
    /// Builds a store with the given initial state, reducer, and environment.
    #[must_use]
    pub fn new(initial_state: S, reducer: R, environment: E) -> Self {
        let (action_tx, _) = broadcast::channel(1024);
        Self { state: Arc::new(RwLock::new(initial_state)), reducer, environment, action_tx }
    }

    /// Sends `action` to the reducer and schedules the effects it returns.
    ///
    /// Returns immediately after the reducer runs and effect tasks are
    /// spawned, not after the effects themselves complete. Use the returned
    /// [`EffectHandle`] to wait for completion.
    #[tracing::instrument(skip(self, action), name = "store_send")]
    pub async fn send(&self, action: A) -> EffectHandle
    where
        R: Clone,
        E: Clone,
    {
        tracing::debug!("processing action");
        metrics::counter!("store.commands.total").increment(1);

        let (handle, tracking) = EffectHandle::new();
        let _ = self.action_tx.send(action.clone());

        let effects = {
            let mut state = self.state.write().await;
            let start = std::time::Instant::now();
            let effects = self.reducer.reduce(&mut state, action, &self.environment);
            metrics::histogram!("store.reducer.duration_seconds").record(start.elapsed().as_secs_f64());
            metrics::histogram!("store.effects.count").record(effects.len() as f64);
            effects
        };

        for effect in effects {
            self.execute_effect(effect, tracking.clone());
        }
        handle
    }

    /// Sends `action`, then waits for the first subsequent action (including
    /// `action` itself) that satisfies `predicate`, up to `timeout`.
    ///
    /// This is how an HTTP handler observes the outcome of a command it just
    /// issued: it subscribes to the store's action stream *before* sending,
    /// so it cannot miss the feedback action even if the effect resolves
    /// immediately.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Timeout`] if no matching action arrives in time.
    pub async fn send_and_wait_for<F>(
        &self,
        action: A,
        predicate: F,
        timeout: Duration,
    ) -> Result<A, StoreError>
    where
        R: Clone,
        E: Clone,
        F: Fn(&A) -> bool + Send,
    {
        let mut rx = self.action_tx.subscribe();
        self.send(action).await;

        tokio::time::timeout(timeout, async {
            loop {
                match rx.recv().await {
                    Ok(candidate) if predicate(&candidate) => return Some(candidate),
                    Ok(_) => {},
                    Err(broadcast::error::RecvError::Lagged(_)) => {},
                    Err(broadcast::error::RecvError::Closed) => return None,
                }
            }
        })
        .await
        .map_err(|_| StoreError::Timeout { after: timeout })?
        .ok_or(StoreError::Timeout { after: timeout })
    }

    /// Reads state through a closure, releasing the lock as soon as it returns.
    pub async fn state<F, T>(&self, f: F) -> T
    where
        F: FnOnce(&S) -> T,
    {
        let state = self.state.read().await;
        f(&state)
    }

    #[allow(clippy::too_many_lines)]
    fn execute_effect(&self, effect: Effect<A>, tracking: EffectTracking)
    where
        R: Clone,
        E: Clone,
    {
        match effect {
            Effect::None => {
                metrics::counter!("store.effects.executed", "type" => "none").increment(1);
            },
            Effect::Future(fut) => {
                metrics::counter!("store.effects.executed", "type" => "future").increment(1);
                tracking.increment();
                let tracking = tracking.clone();
                let store = self.clone();
                tokio::spawn(async move {
                    let _guard = DecrementGuard(tracking);
                    if let Some(action) = fut.await {
                        let _ = store.send(action).await;
                    }
                });
            },
            Effect::Delay { duration, action } => {
                metrics::counter!("store.effects.executed", "type" => "delay").increment(1);
                tracking.increment();
                let tracking = tracking.clone();
                let store = self.clone();
                tokio::spawn(async move {
                    let _guard = DecrementGuard(tracking);
                    tokio::time::sleep(duration).await;
                    let _ = store.send(*action).await;
                });
            },
            Effect::Parallel(effects) => {
                metrics::counter!("store.effects.executed", "type" => "parallel").increment(1);
                for effect in effects {
                    self.execute_effect(effect, tracking.clone());
                }
            },
            Effect::Sequential(effects) => {
                metrics::counter!("store.effects.executed", "type" => "sequential").increment(1);
                tracking.increment();
                let outer = tracking.clone();
                let store = self.clone();
                tokio::spawn(async move {
                    let _guard = DecrementGuard(outer.clone());
                    for effect in effects {
                        let (sub_tx, mut sub_rx) = watch::channel(());
                        let sub = EffectTracking { counter: Arc::new(AtomicUsize::new(0)), notifier: sub_tx };
                        store.execute_effect(effect, sub.clone());
                        if sub.counter.load(Ordering::SeqCst) > 0 {
                            let _ = sub_rx.changed().await;
                        }
                    }
                });
            },
        }
    }
}

impl<S, A, E, R> Clone for Store<S, A, E, R>
where
    R: Reducer<State = S, Action = A, Environment = E> + Clone,
    E: Clone,
{
    fn clone(&self) -> Self {
        Self {
            state: Arc::clone(&self.state),
            reducer: self.reducer.clone(),
            environment: self.environment.clone(),
            action_tx: self.action_tx.clone(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Default)]
    struct Counter {
        value: i32,
    }

    #[derive(Debug, Clone, PartialEq)]
    enum CounterAction {
        Increment,
        IncrementedTo(i32),
    }

    #[derive(Clone)]
    struct CounterReducer;

    impl Reducer for CounterReducer {
        type State = Counter;
        type Action = CounterAction;
        type Environment = ();

        fn reduce(&self, state: &mut Counter, action: CounterAction, _env: &()) -> Vec<Effect<CounterAction>> {
            match action {
                CounterAction::Increment => {
                    state.value += 1;
                    let new_value = state.value;
                    vec![Effect::Future(Box::pin(async move {
                        Some(CounterAction::IncrementedTo(new_value))
                    }))]
                },
                CounterAction::IncrementedTo(_) => vec![],
            }
        }
    }

    #[tokio::test]
    async fn send_applies_reducer_synchronously() {
        let store = Store::new(Counter::default(), CounterReducer, ());
        store.send(CounterAction::Increment).await;
        let value = store.state(|s| s.value).await;
        assert_eq!(value, 1);
    }

    #[tokio::test]
    async fn handle_wait_blocks_until_future_effect_resolves() {
        let store = Store::new(Counter::default(), CounterReducer, ());
        let mut handle = store.send(CounterAction::Increment).await;
        handle.wait_with_timeout(Duration::from_secs(1)).await.unwrap();
    }

    #[tokio::test]
    async fn send_and_wait_for_observes_feedback_action() {
        let store = Store::new(Counter::default(), CounterReducer, ());
        let observed = store
            .send_and_wait_for(
                CounterAction::Increment,
                |a| matches!(a, CounterAction::IncrementedTo(_)),
                Duration::from_secs(1),
            )
            .await
            .unwrap();
        assert_eq!(observed, CounterAction::IncrementedTo(1));
    }

    #[tokio::test]
    async fn send_and_wait_for_times_out_when_predicate_never_matches() {
        let store = Store::new(Counter::default(), CounterReducer, ());
        let result = store
            .send_and_wait_for(CounterAction::Increment, |_| false, Duration::from_millis(50))
            .await;
        assert!(matches!(result, Err(StoreError::Timeout { .. })));
    }

    #[test]
    fn retry_policy_stops_after_max_attempts() {
        let policy = RetryPolicy::new().with_max_attempts(3);
        assert!(policy.should_retry(1));
        assert!(policy.should_retry(2));
        assert!(!policy.should_retry(3));
    }

    #[test]
    fn circuit_breaker_opens_after_failure_threshold() {
        let breaker = CircuitBreaker::new().with_failure_threshold(2);
        assert_eq!(breaker.state(), CircuitState::Closed);
        breaker.record_failure();
        assert_eq!(breaker.state(), CircuitState::Closed);
        breaker.record_failure();
        assert_eq!(breaker.state(), CircuitState::Open);
    }

    #[tokio::test]
    async fn circuit_breaker_rejects_calls_while_open() {
        let breaker = CircuitBreaker::new().with_failure_threshold(1);
        breaker.record_failure();
        let result = breaker.call(|| async { Ok::<_, std::io::Error>(()) }).await;
        assert!(matches!(result, Err(Either::Left(CircuitBreakerError::Open))));
    }
}
