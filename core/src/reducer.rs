//! The Reducer trait - core abstraction for business logic.

use crate::effect::Effect;

/// A pure function mapping `(State, Action, Environment)` to state changes and effects.
///
/// Reducers contain all business logic for a component. They are deterministic,
/// do not perform I/O directly, and describe side effects as data so the runtime
/// (see the `saga-runtime` crate) can execute them.
///
/// # Example
///
/// ```ignore
/// impl Reducer for InventoryReducer {
///     type State = InventoryState;
///     type Action = InventoryAction;
///     type Environment = InventoryEnvironment;
///
///     fn reduce(
///         &self,
///         state: &mut InventoryState,
///         action: InventoryAction,
///         env: &InventoryEnvironment,
///     ) -> Vec<Effect<InventoryAction>> {
///         match action {
///             InventoryAction::OrderCreated { .. } => vec![Effect::None],
///             _ => vec![Effect::None],
///         }
///     }
/// }
/// ```
pub trait Reducer {
    /// The state type this reducer operates on.
    type State;

    /// The action type this reducer processes.
    type Action;

    /// The environment type with injected dependencies.
    type Environment;

    /// Reduce an action into state changes and effects.
    ///
    /// Implementations update `state` in place and return the effects the
    /// runtime should execute. Effects may produce further actions that are
    /// fed back into this reducer.
    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> Vec<Effect<Self::Action>>;
}
