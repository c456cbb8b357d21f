//! # Saga Core
//!
//! Core traits and types shared by every service in the saga demonstrator.
//!
//! This crate provides the functional-core/imperative-shell abstractions that
//! every participant (order, inventory, payment, orchestrator, auth) is built
//! on top of:
//!
//! - **State**: domain state owned by a single service
//! - **Action**: commands and events a reducer can process
//! - **Reducer**: pure function `(State, Action, Environment) -> Vec<Effect<Action>>`
//! - **Effect**: a side effect description, executed by the runtime crate
//! - **Environment**: injected dependencies (clock, event bus, HTTP clients)
//!
//! It also defines the event envelope and `EventBus` trait that the choreographed
//! saga is built around, and the small set of value types (`Money`, order/customer/
//! product identifiers) shared across every crate in the workspace.

pub use chrono::{DateTime, Utc};
pub use serde::{Deserialize, Serialize};

pub mod effect;
pub mod environment;
pub mod event;
pub mod event_bus;
pub mod ids;
pub mod money;
pub mod pricing;
pub mod reducer;

pub use effect::Effect;
pub use environment::Clock;
pub use event::{Envelope, EventError};
pub use event_bus::{EventBus, EventBusError, EventStream};
pub use ids::{CustomerId, OrderId, ProductId};
pub use money::Money;
pub use pricing::PriceSource;
pub use reducer::Reducer;
