//! Usage record persistence
//!
//! The tracker only sees the [`UsageStore`] trait; the JSON file backend is
//! the production default.

use std::io::ErrorKind;
use std::path::PathBuf;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

/// Billed calls for one calendar month
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct QuotaRecord {
    /// Calendar month as `YYYY-MM`
    pub month: String,
    /// Billed calls so far this month
    pub count: u32,
}

impl QuotaRecord {
    /// Empty record for `month`
    pub fn fresh(month: impl Into<String>) -> Self {
        Self {
            month: month.into(),
            count: 0,
        }
    }
}

/// Failure reading or writing the usage record
#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("usage store I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("usage record is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Minimal key-value interface over the persisted usage record
#[async_trait]
pub trait UsageStore: Send + Sync {
    /// Human-readable location for logs
    fn describe(&self) -> String;

    /// `Ok(None)` when nothing has been stored yet
    async fn load(&self) -> Result<Option<QuotaRecord>, PersistenceError>;

    /// Replace the stored record in full
    async fn save(&self, record: &QuotaRecord) -> Result<(), PersistenceError>;
}

/// Stores the record as pretty-printed JSON in a single file
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "usage.json".into());
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

#[async_trait]
impl UsageStore for JsonFileStore {
    fn describe(&self) -> String {
        self.path.display().to_string()
    }

    async fn load(&self) -> Result<Option<QuotaRecord>, PersistenceError> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn save(&self, record: &QuotaRecord) -> Result<(), PersistenceError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }

        // Readers only ever see a complete record
        let temp = self.temp_path();
        let json = serde_json::to_string_pretty(record)?;
        tokio::fs::write(&temp, json).await?;
        tokio::fs::rename(&temp, &self.path).await?;
        Ok(())
    }
}

#[cfg(any(test, feature = "test-utils"))]
pub use memory::InMemoryStore;

#[cfg(any(test, feature = "test-utils"))]
mod memory {
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::sync::Mutex;

    use async_trait::async_trait;

    use super::{PersistenceError, QuotaRecord, UsageStore};

    /// In-memory store for testing
    ///
    /// Can be told to fail writes to exercise the log-and-continue path.
    #[derive(Default)]
    pub struct InMemoryStore {
        record: Mutex<Option<QuotaRecord>>,
        fail_writes: AtomicBool,
        saves: AtomicUsize,
    }

    impl InMemoryStore {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn with_record(record: QuotaRecord) -> Self {
            let store = Self::default();
            *store.record.lock().unwrap() = Some(record);
            store
        }

        pub fn fail_writes(&self, fail: bool) {
            self.fail_writes.store(fail, Ordering::SeqCst);
        }

        /// Last successfully saved record
        pub fn stored(&self) -> Option<QuotaRecord> {
            self.record.lock().unwrap().clone()
        }

        /// Number of successful saves
        pub fn save_count(&self) -> usize {
            self.saves.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl UsageStore for InMemoryStore {
        fn describe(&self) -> String {
            "memory".to_string()
        }

        async fn load(&self) -> Result<Option<QuotaRecord>, PersistenceError> {
            Ok(self.stored())
        }

        async fn save(&self, record: &QuotaRecord) -> Result<(), PersistenceError> {
            if self.fail_writes.load(Ordering::SeqCst) {
                return Err(PersistenceError::Io(std::io::Error::new(
                    std::io::ErrorKind::PermissionDenied,
                    "writes disabled",
                )));
            }
            *self.record.lock().unwrap() = Some(record.clone());
            self.saves.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }
}
