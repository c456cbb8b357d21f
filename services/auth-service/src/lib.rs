//! Auth service: registers and authenticates customers.
//!
//! Unlike the saga participants, this service has no reducer of its own:
//! `register`/`login`/`validate` are direct, idempotent-by-construction
//! calls against [`UsersStore`](saga_auth::UsersStore) with no compensating
//! action and no event-bus involvement, so the functional-core/
//! imperative-shell split the other services use would add structure with
//! nothing to structure.

pub mod config;
pub mod handlers;
pub mod router;

use saga_auth::UsersStore;

pub use config::Config;

/// Shared Axum state.
#[derive(Clone)]
pub struct AppState {
    /// The user store, owned exclusively by this service.
    pub users: UsersStore,
}
