//! Monthly quota tracker
//!
//! Owns the billed-call counter for the current calendar month. A billed call
//! goes through [`QuotaTracker::reserve`], which performs the month rollover,
//! the limit check and takes a provisional slot under one lock acquisition,
//! so concurrent cache misses can never bill more calls than remain.

use std::sync::{Arc, Mutex, MutexGuard};

use serde::Serialize;
use thiserror::Error;
use tracing::{debug, error, info, warn};
use utoipa::ToSchema;

use crate::{
    clock::Clock,
    quota::store::{QuotaRecord, UsageStore},
};

/// Quota block reported to clients
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct QuotaSnapshot {
    /// Calendar month as `YYYY-MM`
    pub month: String,
    /// Billed calls so far this month
    pub count: u32,
    /// Effective monthly limit
    pub limit: u32,
}

/// The effective limit has been reached for this month
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Monthly API call limit reached ({used}/{limit} calls used in {month})")]
pub struct QuotaExceeded {
    pub month: String,
    pub used: u32,
    pub limit: u32,
}

struct QuotaState {
    record: QuotaRecord,
    /// Calls that passed the check but have not completed yet
    reserved: u32,
}

/// Process-wide monthly call counter
pub struct QuotaTracker {
    state: Mutex<QuotaState>,
    limit: u32,
    store: Arc<dyn UsageStore>,
    clock: Arc<dyn Clock>,
    /// Serializes writes so the last save always carries the latest count
    persist_lock: tokio::sync::Mutex<()>,
}

impl QuotaTracker {
    /// Load the persisted record, starting fresh when it is missing,
    /// unreadable, or from another month
    pub async fn load(store: Arc<dyn UsageStore>, limit: u32, clock: Arc<dyn Clock>) -> Self {
        let month = clock.current_month();

        let record = match store.load().await {
            Ok(Some(record)) if record.month == month => record,
            Ok(Some(stale)) => {
                info!(
                    stored_month = %stale.month,
                    current_month = %month,
                    "Stored usage belongs to a previous month, starting fresh"
                );
                QuotaRecord::fresh(month)
            }
            Ok(None) => {
                debug!(store = %store.describe(), "No stored usage, starting fresh");
                QuotaRecord::fresh(month)
            }
            Err(e) => {
                warn!(store = %store.describe(), error = %e, "Stored usage unreadable, starting fresh");
                QuotaRecord::fresh(month)
            }
        };

        Self {
            state: Mutex::new(QuotaState {
                record,
                reserved: 0,
            }),
            limit,
            store,
            clock,
            persist_lock: tokio::sync::Mutex::new(()),
        }
    }

    fn state(&self) -> MutexGuard<'_, QuotaState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn limit(&self) -> u32 {
        self.limit
    }

    /// Current record as held in memory
    pub fn record(&self) -> QuotaRecord {
        self.state().record.clone()
    }

    pub fn snapshot(&self) -> QuotaSnapshot {
        self.snapshot_of(&self.state())
    }

    fn snapshot_of(&self, state: &QuotaState) -> QuotaSnapshot {
        QuotaSnapshot {
            month: state.record.month.clone(),
            count: state.record.count,
            limit: self.limit,
        }
    }

    /// Reset the counter if the calendar month changed; returns whether it did
    pub async fn rollover(&self) -> bool {
        let rolled = self.roll_locked(&mut self.state());
        if rolled {
            self.persist().await;
        }
        rolled
    }

    fn roll_locked(&self, state: &mut QuotaState) -> bool {
        let month = self.clock.current_month();
        if state.record.month == month {
            return false;
        }

        info!(
            previous_month = %state.record.month,
            previous_count = state.record.count,
            current_month = %month,
            "Calendar month changed, resetting quota"
        );
        state.record = QuotaRecord::fresh(month);
        true
    }

    /// Check the counter (including in-flight reservations) against the limit
    pub fn enforce(&self) -> Result<(), QuotaExceeded> {
        self.check_locked(&self.state())
    }

    fn check_locked(&self, state: &QuotaState) -> Result<(), QuotaExceeded> {
        let used = state.record.count.saturating_add(state.reserved);
        if used >= self.limit {
            return Err(QuotaExceeded {
                month: state.record.month.clone(),
                used: state.record.count,
                limit: self.limit,
            });
        }
        Ok(())
    }

    /// Count one billed call and persist
    pub async fn record_usage(&self) -> QuotaSnapshot {
        let snapshot = {
            let mut state = self.state();
            state.record.count = state.record.count.saturating_add(1);
            self.snapshot_of(&state)
        };
        self.persist().await;
        snapshot
    }

    /// Roll over, enforce, and take a provisional slot in one step
    ///
    /// The slot is released when the returned reservation is dropped without
    /// being committed.
    pub async fn reserve(self: &Arc<Self>) -> Result<QuotaReservation, QuotaExceeded> {
        let (rolled, outcome) = {
            let mut state = self.state();
            let rolled = self.roll_locked(&mut state);
            let outcome = self.check_locked(&state).map(|()| {
                state.reserved += 1;
            });
            (rolled, outcome)
        };

        if rolled {
            self.persist().await;
        }

        outcome.map(|()| QuotaReservation {
            tracker: Arc::clone(self),
            settled: false,
        })
    }

    fn release_slot(&self) {
        let mut state = self.state();
        state.reserved = state.reserved.saturating_sub(1);
    }

    async fn persist(&self) {
        let _guard = self.persist_lock.lock().await;
        let record = self.record();

        if let Err(e) = self.store.save(&record).await {
            error!(
                store = %self.store.describe(),
                month = %record.month,
                count = record.count,
                error = %e,
                "Failed to persist usage; in-memory counter remains authoritative"
            );
        }
    }
}

/// Provisional quota slot held across one upstream call
#[must_use = "dropping a reservation releases the slot"]
pub struct QuotaReservation {
    tracker: Arc<QuotaTracker>,
    settled: bool,
}

impl QuotaReservation {
    /// Turn the slot into a billed call and persist
    pub async fn commit(mut self) -> QuotaSnapshot {
        self.settled = true;
        let snapshot = {
            let mut state = self.tracker.state();
            state.reserved = state.reserved.saturating_sub(1);
            state.record.count = state.record.count.saturating_add(1);
            self.tracker.snapshot_of(&state)
        };
        self.tracker.persist().await;
        snapshot
    }

    /// Give the slot back without billing
    pub fn release(mut self) {
        self.settled = true;
        self.tracker.release_slot();
    }
}

impl Drop for QuotaReservation {
    fn drop(&mut self) {
        if !self.settled {
            self.tracker.release_slot();
        }
    }
}
