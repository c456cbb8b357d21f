//! Dependency-injection traits shared across reducer environments.

use chrono::{DateTime, Utc};

/// Abstracts time so reducers and effects stay deterministic under test.
///
/// Production environments use [`SystemClock`]; tests use a fixed clock from
/// the `saga-testing` crate.
pub trait Clock: Send + Sync {
    /// Returns the current time.
    fn now(&self) -> DateTime<Utc>;
}

/// `Clock` implementation backed by the operating system's wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
