//! Airport and airline lookup integration tests

use pretty_assertions::assert_eq;
use serde_json::{json, Value};

use crate::common::TestHarness;
use crate::mocks::AviationstackTestData;

#[tokio::test]
async fn test_airports_lookup_omits_quota() {
    let harness = TestHarness::new().await;
    let payload = AviationstackTestData::airports("John F Kennedy");
    harness
        .provider
        .mock_success_times("/airports", payload.clone(), 1)
        .await;

    let first = harness
        .server
        .get("/airports")
        .add_query_param("search", "kennedy")
        .await;
    first.assert_status_ok();
    let first: Value = first.json();

    assert_eq!(first, json!({ "cached": false, "data": payload }));

    let second: Value = harness
        .server
        .get("/airports")
        .add_query_param("search", "kennedy")
        .await
        .json();

    assert_eq!(second, json!({ "cached": true, "data": payload }));
}

#[tokio::test]
async fn test_airlines_lookup_is_billed() {
    let harness = TestHarness::new().await;
    harness
        .provider
        .mock_catalog_success("/airlines", AviationstackTestData::airlines())
        .await;

    let body: Value = harness
        .server
        .get("/airlines")
        .add_query_param("search", "KLM")
        .await
        .json();

    assert!(body.get("quota").is_none());
    assert_eq!(harness.store.stored().unwrap().count, 1);
    assert_eq!(harness.state.proxy.quota().snapshot().count, 1);
}

#[tokio::test]
async fn test_same_search_on_different_resources_is_not_shared() {
    let harness = TestHarness::new().await;
    harness
        .provider
        .mock_catalog_success("/airports", AviationstackTestData::airports("Schiphol"))
        .await;
    harness
        .provider
        .mock_catalog_success("/airlines", AviationstackTestData::airlines())
        .await;

    let airports: Value = harness
        .server
        .get("/airports")
        .add_query_param("search", "AMS")
        .await
        .json();
    let airlines: Value = harness
        .server
        .get("/airlines")
        .add_query_param("search", "AMS")
        .await
        .json();

    assert_eq!(airports["cached"], json!(false));
    assert_eq!(airlines["cached"], json!(false));
    assert_eq!(harness.provider.calls_to("/airports").await, 1);
    assert_eq!(harness.provider.calls_to("/airlines").await, 1);
}
