//! Monthly quota module
//!
//! Tracks billed upstream calls against the provider's monthly cap and
//! persists the counter across restarts.

pub mod store;
pub mod tracker;

pub use store::{JsonFileStore, PersistenceError, QuotaRecord, UsageStore};
pub use tracker::{QuotaExceeded, QuotaReservation, QuotaSnapshot, QuotaTracker};

#[cfg(any(test, feature = "test-utils"))]
pub use store::InMemoryStore;
