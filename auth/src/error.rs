//! Error taxonomy for the authentication component.

use saga_core::CustomerId;

/// Failure modes for `register` / `login` / `validate`.
#[derive(Debug, Clone, thiserror::Error)]
pub enum AuthError {
    /// Input failed basic validation (empty username/password, etc).
    #[error("invalid input: {0}")]
    Validation(String),
    /// `username` is already registered.
    #[error("user already exists: {username}")]
    Conflict {
        /// The username that collided.
        username: String,
    },
    /// Unknown username, wrong password, or an unrecognized customer id.
    #[error("unauthorized")]
    Unauthorized,
    /// A presented customer id did not match any stored or derivable identity.
    #[error("unknown customer: {customer_id}")]
    UnknownCustomer {
        /// The id that failed to validate.
        customer_id: CustomerId,
    },
}
