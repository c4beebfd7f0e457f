//! Aviationstack API client
//!
//! HTTP client for the metered flight-data provider. Every successful call
//! here is billed by the provider, so nothing in this module retries.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, error, instrument};

use crate::{
    config::Config,
    upstream::models::{Filters, ResourceKind, UpstreamError},
};

/// Interface to the metered provider
///
/// The proxy only talks to the provider through this trait so tests can
/// substitute a scripted implementation.
#[async_trait]
pub trait FlightDataProvider: Send + Sync {
    /// Provider name for logging and metrics
    fn name(&self) -> &'static str;

    /// Whether an access credential is configured
    fn is_configured(&self) -> bool;

    /// Issue one billed GET for the given resource kind
    async fn fetch(&self, filters: &Filters) -> Result<Value, UpstreamError>;

    async fn fetch_flights(&self, filters: &Filters) -> Result<Value, UpstreamError> {
        debug_assert_eq!(filters.kind(), ResourceKind::Flights);
        self.fetch(filters).await
    }

    async fn fetch_airports(&self, filters: &Filters) -> Result<Value, UpstreamError> {
        debug_assert_eq!(filters.kind(), ResourceKind::Airports);
        self.fetch(filters).await
    }

    async fn fetch_airlines(&self, filters: &Filters) -> Result<Value, UpstreamError> {
        debug_assert_eq!(filters.kind(), ResourceKind::Airlines);
        self.fetch(filters).await
    }
}

/// Aviationstack client
pub struct AviationstackClient {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
    timeout: Duration,
}

impl AviationstackClient {
    /// Create a new Aviationstack client
    pub fn new(client: reqwest::Client, config: &Config) -> Self {
        Self {
            client,
            base_url: config.aviationstack_api_url.trim_end_matches('/').to_string(),
            api_key: config.aviationstack_api_key.clone(),
            timeout: Duration::from_secs(config.upstream_timeout_seconds),
        }
    }

    fn endpoint(&self, kind: ResourceKind) -> String {
        format!("{}{}", self.base_url, kind.path())
    }
}

#[async_trait]
impl FlightDataProvider for AviationstackClient {
    fn name(&self) -> &'static str {
        "aviationstack"
    }

    fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    #[instrument(skip(self, filters), fields(kind = %filters.kind()))]
    async fn fetch(&self, filters: &Filters) -> Result<Value, UpstreamError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| UpstreamError::Network("access key is not configured".to_string()))?;

        let url = self.endpoint(filters.kind());
        let mut query: Vec<(&str, &str)> = vec![("access_key", api_key)];
        query.extend(filters.params());

        debug!(url = %url, params = ?filters.params().collect::<Vec<_>>(), "Calling Aviationstack");

        let response = self
            .client
            .get(&url)
            .query(&query)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| {
                error!(url = %url, error = %e, "Aviationstack request failed");
                UpstreamError::from(e)
            })?;

        let status = response.status();
        debug!(status = %status, "Aviationstack response status");

        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            error!(status = %status, body = %text, "Aviationstack returned an error status");

            let body = serde_json::from_str::<Value>(&text)
                .ok()
                .or_else(|| (!text.is_empty()).then(|| Value::String(text)));

            return Err(UpstreamError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| {
            error!(error = %e, "Failed to parse Aviationstack response");
            UpstreamError::Decode(e.to_string())
        })
    }
}
