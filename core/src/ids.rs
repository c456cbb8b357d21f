//! Newtype identifiers shared across every service.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Customer identifier.
///
/// Customer ids are deterministic UUIDv5 values derived from a username and a
/// namespace (see the `saga-auth` crate); this type is a thin wrapper so the
/// rest of the workspace never has to reason about that derivation.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CustomerId(String);

/// Order identifier, a monotonic time-derived token minted by the order participant.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OrderId(String);

/// Product identifier, stable across the catalog's lifetime.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProductId(String);

macro_rules! string_id {
    ($ty:ident) => {
        impl $ty {
            /// Wraps a raw string as this identifier, without validation.
            #[must_use]
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Borrows the identifier as a string slice.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<String> for $ty {
            fn from(value: String) -> Self {
                Self(value)
            }
        }

        impl From<&str> for $ty {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }
    };
}

string_id!(CustomerId);
string_id!(OrderId);
string_id!(ProductId);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn order_id_round_trips_through_display() {
        let id = OrderId::new("order-abc123");
        assert_eq!(id.to_string(), "order-abc123");
        assert_eq!(id.as_str(), "order-abc123");
    }

    #[test]
    fn ids_of_the_same_string_are_equal() {
        assert_eq!(ProductId::new("prod-1"), ProductId::from("prod-1"));
    }
}
