//! Deterministic customer identity, shared by the orchestrated and
//! choreographed flows alike.
//!
//! Credentials live only here: passwords are hashed with bcrypt at the
//! default cost, and a customer's id is a pure function of their username
//! and a caller-supplied namespace (`uuidv5(namespace, lower(trim(username)))`).
//! Authenticating under a namespace other than the one a user last used
//! normalizes their stored id in place, so the same person looks like the
//! same customer regardless of which namespace a flow happens to present.

pub mod error;
pub mod user;

pub use error::AuthError;
pub use user::{UsersStore, User, DEFAULT_NAMESPACE};
