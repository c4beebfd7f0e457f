//! Health, metrics and docs endpoint integration tests

use axum::http::StatusCode;
use chrono::{TimeZone, Utc};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};

use crate::common::TestHarness;

#[tokio::test]
async fn test_liveness_always_ok() {
    let harness = TestHarness::builder()
        .configure(|config| config.aviationstack_api_key = None)
        .build()
        .await;

    let response = harness.server.get("/health/live").await;

    response.assert_status_ok();
    assert_eq!(response.json::<Value>(), json!({ "status": "healthy" }));
}

#[tokio::test]
async fn test_health_reports_quota_and_cache() {
    let harness = TestHarness::builder()
        .with_record("2025-08", 12)
        .build()
        .await;

    let response = harness.server.get("/health").await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["status"], json!("healthy"));
    assert_eq!(body["version"], json!(env!("CARGO_PKG_VERSION")));
    assert_eq!(body["checks"]["upstream"]["status"], json!("healthy"));
    assert_eq!(
        body["stats"]["quota"],
        json!({ "month": "2025-08", "count": 12, "limit": 95 })
    );
    assert_eq!(body["stats"]["cached_responses"], json!(0));
}

#[tokio::test]
async fn test_health_degraded_when_quota_spent() {
    let harness = TestHarness::builder()
        .with_record("2025-08", 95)
        .build()
        .await;

    let response = harness.server.get("/health").await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["status"], json!("degraded"));
    assert_eq!(body["checks"]["quota"]["status"], json!("degraded"));
}

#[tokio::test]
async fn test_health_recovers_when_month_changes() {
    let harness = TestHarness::builder()
        .with_record("2025-08", 95)
        .starting_at(Utc.with_ymd_and_hms(2025, 8, 31, 23, 59, 0).unwrap())
        .build()
        .await;

    let before: Value = harness.server.get("/health").await.json();
    assert_eq!(before["status"], json!("degraded"));

    harness
        .clock
        .set(Utc.with_ymd_and_hms(2025, 9, 1, 0, 0, 30).unwrap());

    let response = harness.server.get("/health").await;
    response.assert_status_ok();
    let after: Value = response.json();

    assert_eq!(after["status"], json!("healthy"));
    assert_eq!(after["checks"]["quota"]["status"], json!("healthy"));
    assert_eq!(
        after["stats"]["quota"],
        json!({ "month": "2025-09", "count": 0, "limit": 95 })
    );
    assert_eq!(harness.store.stored().unwrap().month, "2025-09");
}

#[tokio::test]
async fn test_not_ready_without_access_key() {
    let harness = TestHarness::builder()
        .configure(|config| config.aviationstack_api_key = None)
        .build()
        .await;

    let ready = harness.server.get("/health/ready").await;
    assert_eq!(ready.status_code(), StatusCode::SERVICE_UNAVAILABLE);

    let health = harness.server.get("/health").await;
    assert_eq!(health.status_code(), StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(health.json::<Value>()["status"], json!("unhealthy"));
}

#[tokio::test]
async fn test_openapi_document_lists_proxy_paths() {
    let harness = TestHarness::new().await;

    let response = harness.server.get("/docs/openapi.json").await;

    response.assert_status_ok();
    let doc: Value = response.json();
    for path in ["/flights", "/airports", "/airlines"] {
        assert!(doc["paths"].get(path).is_some(), "missing {path}");
    }
}

#[tokio::test]
async fn test_metrics_endpoint_renders() {
    let harness = TestHarness::new().await;

    harness.server.get("/metrics").await.assert_status_ok();
}
