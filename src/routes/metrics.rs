//! Prometheus metrics endpoint
//!
//! Exposes application metrics in Prometheus format for monitoring.

use axum::response::IntoResponse;
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use once_cell::sync::Lazy;

use crate::upstream::ResourceKind;

/// Global Prometheus handle for metrics export
static PROMETHEUS_HANDLE: Lazy<PrometheusHandle> = Lazy::new(|| {
    PrometheusBuilder::new()
        .install_recorder()
        .expect("Failed to install Prometheus recorder")
});

/// Initialize metrics (call once at startup)
pub fn init_metrics() {
    // Force initialization of the lazy static
    let _ = &*PROMETHEUS_HANDLE;

    register_metrics();
}

fn register_metrics() {
    metrics::describe_counter!(
        "flightdeck_requests_total",
        "Total number of proxy requests by resource and outcome"
    );
    metrics::describe_histogram!(
        "flightdeck_request_duration_seconds",
        "Proxy request duration in seconds"
    );
    metrics::describe_counter!(
        "flightdeck_cache_operations_total",
        "Response cache lookups by result"
    );
    metrics::describe_counter!(
        "flightdeck_upstream_calls_total",
        "Calls made to the flight-data provider"
    );
    metrics::describe_histogram!(
        "flightdeck_upstream_duration_seconds",
        "Provider call duration in seconds"
    );
    metrics::describe_gauge!(
        "flightdeck_quota_used",
        "Billed provider calls in the current month"
    );
}

/// Prometheus metrics endpoint handler
///
/// Returns metrics in Prometheus text format for scraping.
pub async fn prometheus_metrics() -> impl IntoResponse {
    PROMETHEUS_HANDLE.render()
}

/// Record a proxy request
pub fn record_request(kind: ResourceKind, outcome: &str, duration_secs: f64) {
    metrics::counter!(
        "flightdeck_requests_total",
        "kind" => kind.as_str(),
        "outcome" => outcome.to_string()
    )
    .increment(1);
    metrics::histogram!("flightdeck_request_duration_seconds", "kind" => kind.as_str())
        .record(duration_secs);
}

/// Record cache operation
pub fn record_cache_operation(result: &str) {
    metrics::counter!("flightdeck_cache_operations_total", "result" => result.to_string())
        .increment(1);
}

/// Record one provider call
pub fn record_upstream_call(kind: ResourceKind, outcome: &str, duration_secs: f64) {
    metrics::counter!(
        "flightdeck_upstream_calls_total",
        "kind" => kind.as_str(),
        "outcome" => outcome.to_string()
    )
    .increment(1);
    metrics::histogram!("flightdeck_upstream_duration_seconds", "kind" => kind.as_str())
        .record(duration_secs);
}

pub fn set_quota_used(count: u32) {
    metrics::gauge!("flightdeck_quota_used").set(f64::from(count));
}
