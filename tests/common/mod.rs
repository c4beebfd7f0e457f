//! Common test utilities for Flightdeck
//!
//! Builds the full router against a mock provider, an in-memory usage store
//! and a manually driven clock.

#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::Arc;

use axum_test::TestServer;
use chrono::{DateTime, TimeZone, Utc};

use flightdeck::{
    clock::{Clock, ManualClock},
    quota::{InMemoryStore, QuotaRecord, UsageStore},
    routes, AppState, AviationstackClient, Config, FlightDataProvider,
};

use crate::mocks::{MockAviationstack, TEST_ACCESS_KEY};

/// Instant the manual clock starts at
pub fn test_start() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 8, 15, 12, 0, 0).unwrap()
}

/// Config pointing at the mock provider with the default quota settings
pub fn test_config(provider_url: &str) -> Config {
    Config {
        host: "127.0.0.1".to_string(),
        port: 0,
        aviationstack_api_url: provider_url.to_string(),
        aviationstack_api_key: Some(TEST_ACCESS_KEY.to_string()),
        usage_file: PathBuf::from("unused.json"),
        monthly_call_limit: 100,
        quota_safety_buffer: 5,
        cache_ttl_seconds: 600,
        cache_max_entries: 100,
        upstream_timeout_seconds: 2,
        bill_embedded_errors: true,
    }
}

/// Builder for [`TestHarness`]
pub struct TestHarnessBuilder {
    record: Option<QuotaRecord>,
    start: DateTime<Utc>,
    tweak: Box<dyn FnOnce(&mut Config)>,
}

impl TestHarnessBuilder {
    /// Seed the usage store with an existing record
    pub fn with_record(mut self, month: &str, count: u32) -> Self {
        self.record = Some(QuotaRecord {
            month: month.to_string(),
            count,
        });
        self
    }

    /// Start the clock somewhere other than [`test_start`]
    pub fn starting_at(mut self, start: DateTime<Utc>) -> Self {
        self.start = start;
        self
    }

    /// Adjust the config before the app is built
    pub fn configure(mut self, f: impl FnOnce(&mut Config) + 'static) -> Self {
        self.tweak = Box::new(f);
        self
    }

    pub async fn build(self) -> TestHarness {
        let provider = MockAviationstack::start().await;

        let mut config = test_config(&provider.uri());
        (self.tweak)(&mut config);

        let store = Arc::new(match self.record {
            Some(record) => InMemoryStore::with_record(record),
            None => InMemoryStore::new(),
        });
        let clock = Arc::new(ManualClock::new(self.start));
        let upstream: Arc<dyn FlightDataProvider> = Arc::new(AviationstackClient::new(
            reqwest::Client::new(),
            &config,
        ));

        let state = Arc::new(
            AppState::new_for_testing(
                config,
                store.clone() as Arc<dyn UsageStore>,
                upstream,
                clock.clone() as Arc<dyn Clock>,
            )
            .await,
        );

        let app = routes::create_router(state.clone());
        let server = TestServer::new(app).expect("Failed to create test server");

        TestHarness {
            server,
            provider,
            store,
            clock,
            state,
        }
    }
}

/// Complete test environment:
/// - Mock Aviationstack server (wiremock)
/// - In-memory usage store the test can inspect
/// - Manual clock for TTL and month rollover
/// - Real app router with all layers
pub struct TestHarness {
    pub server: TestServer,
    pub provider: MockAviationstack,
    pub store: Arc<InMemoryStore>,
    pub clock: Arc<ManualClock>,
    pub state: Arc<AppState>,
}

impl TestHarness {
    pub fn builder() -> TestHarnessBuilder {
        TestHarnessBuilder {
            record: None,
            start: test_start(),
            tweak: Box::new(|_| {}),
        }
    }

    /// Harness with an empty usage record and default config
    pub async fn new() -> Self {
        Self::builder().build().await
    }
}
