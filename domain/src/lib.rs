//! Domain state: the catalog and order stores shared by every saga
//! participant and by the orchestrated coordinator.
//!
//! Each store serializes writes behind a single `RwLock` and lets reads
//! proceed concurrently ("single-writer, multi-reader discipline" per
//! entity). A write that spans several items (reserving N line items) is
//! atomic at the store boundary: either every decrement succeeds, or the
//! ones already applied in that call are rolled back before the lock is
//! released.

pub mod catalog;
pub mod order;

pub use catalog::{Catalog, ReservationError};
pub use order::{Order, OrderItem, OrderStatus, OrderStore};
