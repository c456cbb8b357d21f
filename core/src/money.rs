//! Fixed-point money amount, represented in cents to avoid floating-point drift.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, Mul, Sub};

/// A non-negative-by-convention monetary amount, stored as integer cents.
///
/// Products carry a `Money` price, orders snapshot `Money` totals, and the
/// payment gateway compares `Money` amounts against its configured ceiling.
/// Arithmetic stays in integer cents throughout so totals never accumulate
/// binary floating-point rounding error.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Money(i64);

impl Money {
    /// Builds a `Money` value from a cent amount.
    #[must_use]
    pub const fn from_cents(cents: i64) -> Self {
        Self(cents)
    }

    /// Builds a `Money` value by parsing a decimal string such as `"19.90"`.
    ///
    /// Returns `None` if the string has more than two fractional digits or is
    /// not a valid decimal number.
    #[must_use]
    pub fn from_decimal_str(value: &str) -> Option<Self> {
        let (whole, frac) = value.split_once('.').unwrap_or((value, ""));
        if frac.len() > 2 {
            return None;
        }
        let whole: i64 = whole.parse().ok()?;
        let frac_cents: i64 = format!("{frac:0<2}").parse().ok()?;
        let sign = if whole.is_negative() || value.starts_with('-') { -1 } else { 1 };
        Some(Self(whole * 100 + sign * frac_cents))
    }

    /// Returns the amount in integer cents.
    #[must_use]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Returns the amount as a floating-point dollar value, for display only.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn as_f64(&self) -> f64 {
        self.0 as f64 / 100.0
    }

    /// Builds a `Money` value from a floating-point dollar amount.
    ///
    /// Used only at configuration boundaries (e.g. `PAYMENT_GATEWAY_LIMIT`)
    /// where the source value is itself a float; domain arithmetic never
    /// round-trips through `f64`.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn from_f64(value: f64) -> Self {
        Self((value * 100.0).round() as i64)
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.as_f64())
    }
}

impl Add for Money {
    type Output = Money;
    fn add(self, rhs: Money) -> Money {
        Money(self.0 + rhs.0)
    }
}

impl Sub for Money {
    type Output = Money;
    fn sub(self, rhs: Money) -> Money {
        Money(self.0 - rhs.0)
    }
}

impl Mul<u32> for Money {
    type Output = Money;
    fn mul(self, rhs: u32) -> Money {
        Money(self.0 * i64::from(rhs))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_two_decimal_places() {
        assert_eq!(Money::from_decimal_str("19.90"), Some(Money::from_cents(1990)));
        assert_eq!(Money::from_decimal_str("1299.99"), Some(Money::from_cents(129_999)));
    }

    #[test]
    fn rejects_more_than_two_fractional_digits() {
        assert_eq!(Money::from_decimal_str("19.900"), None);
    }

    #[test]
    fn multiplies_unit_price_by_quantity() {
        let price = Money::from_cents(1990);
        assert_eq!(price * 2, Money::from_cents(3980));
    }

    #[test]
    fn displays_with_two_decimal_places() {
        assert_eq!(Money::from_cents(3980).to_string(), "39.80");
    }
}
