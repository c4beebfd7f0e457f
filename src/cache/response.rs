//! Upstream response cache
//!
//! In-memory, time-bounded store of provider responses keyed by normalized
//! request. Entries expire after a fixed TTL and are dropped lazily on read;
//! once the store reaches capacity, expired entries are swept and then the
//! least recently used entry is evicted.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{DateTime, Duration, Utc};
use serde_json::Value;
use tracing::debug;

use crate::clock::Clock;

/// Default time-to-live for cached responses
pub const DEFAULT_TTL_SECONDS: i64 = 600;

struct CacheEntry {
    payload: Value,
    expires_at: DateTime<Utc>,
    last_used: u64,
}

impl CacheEntry {
    fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }
}

#[derive(Default)]
struct CacheStore {
    entries: HashMap<String, CacheEntry>,
    /// Monotonic use counter for LRU ordering
    tick: u64,
}

impl CacheStore {
    fn next_tick(&mut self) -> u64 {
        self.tick += 1;
        self.tick
    }

    fn evict_expired(&mut self, now: DateTime<Utc>) -> usize {
        let before = self.entries.len();
        self.entries.retain(|_, entry| !entry.is_expired(now));
        before - self.entries.len()
    }

    fn evict_lru(&mut self) {
        let oldest = self
            .entries
            .iter()
            .min_by_key(|(_, entry)| entry.last_used)
            .map(|(key, _)| key.clone());

        if let Some(key) = oldest {
            debug!(key = %key, "Evicting least recently used response");
            self.entries.remove(&key);
        }
    }
}

/// Response cache shared by all proxy endpoints
pub struct ResponseCache {
    store: Mutex<CacheStore>,
    ttl: Duration,
    max_entries: usize,
    clock: Arc<dyn Clock>,
}

impl ResponseCache {
    /// Create a cache; `max_entries` is clamped to at least 1
    pub fn new(ttl: Duration, max_entries: usize, clock: Arc<dyn Clock>) -> Self {
        Self {
            store: Mutex::new(CacheStore::default()),
            ttl,
            max_entries: max_entries.max(1),
            clock,
        }
    }

    fn store(&self) -> MutexGuard<'_, CacheStore> {
        self.store.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Stored payload if still fresh; expired entries are removed and miss
    pub fn get(&self, key: &str) -> Option<Value> {
        let now = self.clock.now();
        let mut store = self.store();

        let expired = store.entries.get(key).map(|entry| entry.is_expired(now))?;
        if expired {
            debug!(key = %key, "Cached response expired");
            store.entries.remove(key);
            return None;
        }

        let tick = store.next_tick();
        let entry = store.entries.get_mut(key)?;
        entry.last_used = tick;
        Some(entry.payload.clone())
    }

    /// Store a payload for one TTL, replacing any previous entry
    pub fn put(&self, key: impl Into<String>, payload: Value) {
        let key = key.into();
        let now = self.clock.now();
        let mut store = self.store();

        if !store.entries.contains_key(&key) && store.entries.len() >= self.max_entries {
            let swept = store.evict_expired(now);
            if swept > 0 {
                debug!(swept, "Swept expired responses");
            }
            while store.entries.len() >= self.max_entries {
                store.evict_lru();
            }
        }

        let tick = store.next_tick();
        store.entries.insert(
            key,
            CacheEntry {
                payload,
                expires_at: now + self.ttl,
                last_used: tick,
            },
        );
    }

    /// Number of stored entries, including expired ones not yet swept
    pub fn len(&self) -> usize {
        self.store().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop every expired entry; returns how many were removed
    pub fn purge_expired(&self) -> usize {
        let now = self.clock.now();
        self.store().evict_expired(now)
    }

    /// Clear all entries
    pub fn clear(&self) {
        self.store().entries.clear();
    }
}
