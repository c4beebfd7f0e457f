//! Proxy orchestration
//!
//! One request through the proxy: cache lookup, quota reservation, a single
//! upstream call, then commit-and-cache or release. Shared by every resource
//! endpoint.

use std::sync::Arc;
use std::time::Instant;

use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info, instrument, warn};
use utoipa::ToSchema;

use crate::{
    cache::ResponseCache,
    error::{AppError, AppResult},
    quota::{QuotaSnapshot, QuotaTracker},
    routes::metrics::{record_cache_operation, record_upstream_call, set_quota_used},
    upstream::{Filters, FlightDataProvider, ResourceKind, UpstreamError},
};

/// Successful proxy response
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ProxyResponse {
    /// Whether the payload was served from the cache
    pub cached: bool,
    /// Monthly usage (flights only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quota: Option<QuotaSnapshot>,
    /// Provider payload, passed through unchanged
    #[schema(value_type = Object)]
    pub data: Value,
}

/// Owns the quota counter, the response cache and the provider client
pub struct ProxyService {
    quota: Arc<QuotaTracker>,
    cache: Arc<ResponseCache>,
    upstream: Arc<dyn FlightDataProvider>,
    /// Whether a 2xx body carrying a provider error counts against quota
    bill_embedded_errors: bool,
}

impl ProxyService {
    pub fn new(
        quota: Arc<QuotaTracker>,
        cache: Arc<ResponseCache>,
        upstream: Arc<dyn FlightDataProvider>,
        bill_embedded_errors: bool,
    ) -> Self {
        Self {
            quota,
            cache,
            upstream,
            bill_embedded_errors,
        }
    }

    pub fn quota(&self) -> &Arc<QuotaTracker> {
        &self.quota
    }

    pub fn cache(&self) -> &Arc<ResponseCache> {
        &self.cache
    }

    pub fn upstream(&self) -> &Arc<dyn FlightDataProvider> {
        &self.upstream
    }

    /// Serve one request for the resource described by `filters`
    #[instrument(skip(self, filters), fields(kind = %filters.kind()))]
    pub async fn handle(&self, filters: Filters) -> AppResult<ProxyResponse> {
        let kind = filters.kind();

        if !self.upstream.is_configured() {
            return Err(AppError::MissingCredential);
        }

        let key = filters.cache_key();
        if let Some(data) = self.cache.get(&key) {
            debug!(key = %key, "Cache hit");
            record_cache_operation("hit");
            return Ok(self.respond(kind, true, data, None));
        }
        record_cache_operation("miss");

        let reservation = self.quota.reserve().await?;

        let started = Instant::now();
        let result = match kind {
            ResourceKind::Flights => self.upstream.fetch_flights(&filters).await,
            ResourceKind::Airports => self.upstream.fetch_airports(&filters).await,
            ResourceKind::Airlines => self.upstream.fetch_airlines(&filters).await,
        };
        let elapsed = started.elapsed().as_secs_f64();

        let data = match result {
            Ok(data) => data,
            Err(e) => {
                record_upstream_call(kind, e.kind(), elapsed);
                reservation.release();
                return Err(AppError::upstream(kind, e));
            }
        };

        if let Some(embedded) = UpstreamError::from_embedded(&data) {
            record_upstream_call(kind, embedded.kind(), elapsed);
            if self.bill_embedded_errors {
                let snapshot = reservation.commit().await;
                set_quota_used(snapshot.count);
                warn!(key = %key, count = snapshot.count, "Provider error in successful response, billed");
            } else {
                reservation.release();
                warn!(key = %key, "Provider error in successful response, not billed");
            }
            return Err(AppError::upstream(kind, embedded));
        }
        record_upstream_call(kind, "ok", elapsed);

        let snapshot = reservation.commit().await;
        set_quota_used(snapshot.count);
        self.cache.put(key.clone(), data.clone());

        info!(
            key = %key,
            count = snapshot.count,
            limit = snapshot.limit,
            "Fetched from upstream"
        );

        Ok(self.respond(kind, false, data, Some(snapshot)))
    }

    fn respond(
        &self,
        kind: ResourceKind,
        cached: bool,
        data: Value,
        snapshot: Option<QuotaSnapshot>,
    ) -> ProxyResponse {
        let quota = kind
            .reports_quota()
            .then(|| snapshot.unwrap_or_else(|| self.quota.snapshot()));

        ProxyResponse {
            cached,
            quota,
            data,
        }
    }
}
