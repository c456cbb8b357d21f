//! Deterministic customer identity: `users` store keyed by username, with
//! id normalization across namespaces.

use crate::error::AuthError;
use saga_core::CustomerId;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

/// Namespace used when a caller doesn't supply one.
pub const DEFAULT_NAMESPACE: Uuid = Uuid::NAMESPACE_DNS;

/// A registered user: stable identity plus credentials.
#[derive(Clone, Debug, PartialEq)]
pub struct User {
    /// `uuidv5(namespace, lower(trim(username)))`.
    pub id: CustomerId,
    /// Lowercased, trimmed. Unique within the store.
    pub username: String,
    /// Optional contact email.
    pub email: Option<String>,
    /// Optional display name.
    pub name: Option<String>,
    /// Bcrypt hash at the default cost.
    pub password_hash: String,
    /// The namespace `id` was last derived under.
    pub namespace: Uuid,
}

fn derive_id(namespace: Uuid, normalized_username: &str) -> CustomerId {
    CustomerId::new(Uuid::new_v5(&namespace, normalized_username.as_bytes()).to_string())
}

#[derive(Default)]
struct Inner {
    by_username: HashMap<String, User>,
    by_id: HashMap<CustomerId, String>,
}

/// The authoritative in-memory user store, owned by the authentication
/// service.
#[derive(Clone, Default)]
pub struct UsersStore {
    inner: Arc<RwLock<Inner>>,
}

impl UsersStore {
    /// Builds an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a new user under `namespace`, hashing `password` with
    /// bcrypt. Fails if `username` (case-insensitively) is already taken.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Validation`] for empty credentials and
    /// [`AuthError::Conflict`] if the username is already registered.
    pub async fn register(
        &self,
        username: &str,
        password: &str,
        email: Option<String>,
        name: Option<String>,
        namespace: Uuid,
    ) -> Result<CustomerId, AuthError> {
        let key = username.trim().to_lowercase();
        if key.is_empty() {
            return Err(AuthError::Validation("username must not be empty".into()));
        }
        if password.is_empty() {
            return Err(AuthError::Validation("password must not be empty".into()));
        }

        let mut inner = self.inner.write().await;
        if inner.by_username.contains_key(&key) {
            return Err(AuthError::Conflict { username: key });
        }

        let password_hash = bcrypt::hash(password, bcrypt::DEFAULT_COST)
            .map_err(|err| AuthError::Validation(format!("failed to hash password: {err}")))?;
        let id = derive_id(namespace, &key);
        let user =
            User { id: id.clone(), username: key.clone(), email, name, password_hash, namespace };

        inner.by_id.insert(id.clone(), key.clone());
        inner.by_username.insert(key, user);
        metrics::counter!("auth.register.total").increment(1);
        Ok(id)
    }

    /// Verifies `username`/`password` and returns the customer id under
    /// `namespace`, normalizing the stored record in place if it was last
    /// derived under a different namespace.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Unauthorized`] for an unknown username or a
    /// password mismatch.
    pub async fn login(
        &self,
        username: &str,
        password: &str,
        namespace: Uuid,
    ) -> Result<CustomerId, AuthError> {
        let key = username.trim().to_lowercase();
        let mut inner = self.inner.write().await;
        let user = inner.by_username.get_mut(&key).ok_or(AuthError::Unauthorized)?;

        let verified = bcrypt::verify(password, &user.password_hash).unwrap_or(false);
        if !verified {
            return Err(AuthError::Unauthorized);
        }

        if user.namespace == namespace {
            metrics::counter!("auth.login.total").increment(1);
            return Ok(user.id.clone());
        }

        let old_id = user.id.clone();
        let new_id = derive_id(namespace, &key);
        user.namespace = namespace;
        user.id = new_id.clone();
        inner.by_id.remove(&old_id);
        inner.by_id.insert(new_id.clone(), key);
        tracing::debug!(%old_id, %new_id, "normalized customer id to new namespace on login");
        metrics::counter!("auth.login.total").increment(1);
        Ok(new_id)
    }

    /// Accepts `customer_id` if it matches a stored id, or (when
    /// `namespace` is supplied) if it equals the id derivable for any
    /// stored user under that namespace (normalizing that record in place).
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::UnknownCustomer`] if neither check succeeds.
    pub async fn validate(
        &self,
        customer_id: &CustomerId,
        namespace: Option<Uuid>,
    ) -> Result<CustomerId, AuthError> {
        let mut inner = self.inner.write().await;
        if inner.by_id.contains_key(customer_id) {
            return Ok(customer_id.clone());
        }

        let Some(namespace) = namespace else {
            return Err(AuthError::UnknownCustomer { customer_id: customer_id.clone() });
        };
        let Some(key) = inner
            .by_username
            .iter()
            .find(|(username, _)| derive_id(namespace, username) == *customer_id)
            .map(|(username, _)| username.clone())
        else {
            return Err(AuthError::UnknownCustomer { customer_id: customer_id.clone() });
        };

        let Some(user) = inner.by_username.get_mut(&key) else {
            return Err(AuthError::UnknownCustomer { customer_id: customer_id.clone() });
        };
        let old_id = user.id.clone();
        user.namespace = namespace;
        user.id = customer_id.clone();
        inner.by_id.remove(&old_id);
        inner.by_id.insert(customer_id.clone(), key);
        tracing::debug!(%old_id, new_id = %customer_id, "normalized customer id on validate");
        Ok(customer_id.clone())
    }
}
