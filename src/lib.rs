//! Flightdeck - caching, quota-enforcing proxy for a metered flight-data API
//!
//! This library provides the core functionality for the Flightdeck proxy
//! server. It serves repeated queries from a short-lived cache and keeps
//! billed provider calls under a persisted monthly cap.

pub mod cache;
pub mod clock;
pub mod config;
pub mod docs;
pub mod error;
pub mod proxy;
pub mod quota;
pub mod routes;
pub mod upstream;

use std::sync::Arc;
use std::time::Instant;

use anyhow::Result;

pub use crate::cache::ResponseCache;
pub use crate::clock::{Clock, SystemClock};
pub use crate::config::Config;
pub use crate::proxy::{ProxyResponse, ProxyService};
pub use crate::quota::{JsonFileStore, QuotaTracker, UsageStore};
pub use crate::upstream::{AviationstackClient, FlightDataProvider};

/// Application state shared across all request handlers
pub struct AppState {
    pub config: Config,
    pub start_time: Instant,
    /// Quota counter, response cache and provider client
    pub proxy: Arc<ProxyService>,
}

impl AppState {
    /// Create a new application state
    pub async fn new(config: Config) -> Result<Self> {
        // Per-request timeouts are applied by the provider client
        let http_client = reqwest::Client::builder()
            .pool_max_idle_per_host(16)
            .build()?;

        let upstream: Arc<dyn FlightDataProvider> =
            Arc::new(AviationstackClient::new(http_client, &config));
        let store: Arc<dyn UsageStore> = Arc::new(JsonFileStore::new(&config.usage_file));
        let clock: Arc<dyn Clock> = Arc::new(SystemClock);

        Ok(Self::assemble(config, store, upstream, clock).await)
    }

    /// Create a new application state for testing with a scripted clock,
    /// an in-memory usage store and a provider pointing at a mock server
    #[cfg(any(test, feature = "test-utils"))]
    pub async fn new_for_testing(
        config: Config,
        store: Arc<dyn UsageStore>,
        upstream: Arc<dyn FlightDataProvider>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self::assemble(config, store, upstream, clock).await
    }

    async fn assemble(
        config: Config,
        store: Arc<dyn UsageStore>,
        upstream: Arc<dyn FlightDataProvider>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let quota = Arc::new(
            QuotaTracker::load(store, config.effective_limit(), clock.clone()).await,
        );

        let cache = Arc::new(ResponseCache::new(
            config.cache_ttl(),
            config.cache_max_entries,
            clock,
        ));

        let proxy = Arc::new(ProxyService::new(
            quota,
            cache,
            upstream,
            config.bill_embedded_errors,
        ));

        Self {
            config,
            start_time: Instant::now(),
            proxy,
        }
    }
}
