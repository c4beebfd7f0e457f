//! Mock Aviationstack API server for testing
//!
//! Provides wiremock-based mocks for the provider endpoints:
//! - GET /flights - Real-time flight search
//! - GET /airports - Airport lookup
//! - GET /airlines - Airline lookup
//!
//! # Example
//!
//! ```rust,ignore
//! let mock = MockAviationstack::start().await;
//! mock.mock_flights_success(AviationstackTestData::delta_89()).await;
//! // Use mock.uri() as AVIATIONSTACK_API_URL
//! ```

use std::time::Duration;

use serde_json::{json, Value};
use wiremock::{
    matchers::{method, path, query_param},
    Mock, MockServer, ResponseTemplate,
};

/// Access key the harness configures and the mocks require
pub const TEST_ACCESS_KEY: &str = "test-aviationstack-key";

/// Mock Aviationstack server wrapper
pub struct MockAviationstack {
    server: MockServer,
}

impl MockAviationstack {
    /// Start a new mock provider
    pub async fn start() -> Self {
        let server = MockServer::start().await;
        Self { server }
    }

    /// Get the mock server URI
    pub fn uri(&self) -> String {
        self.server.uri()
    }

    /// Get all received requests (for assertion in tests)
    pub async fn received_requests(&self) -> Vec<wiremock::Request> {
        self.server.received_requests().await.unwrap_or_default()
    }

    /// Number of calls received on one resource path
    pub async fn calls_to(&self, resource: &str) -> usize {
        self.received_requests()
            .await
            .iter()
            .filter(|r| r.url.path() == resource)
            .count()
    }

    // =========================================================================
    // Success responses
    // =========================================================================

    /// Mock a successful response on `resource`, expected exactly `times` times
    pub async fn mock_success_times(&self, resource: &str, body: Value, times: u64) {
        Mock::given(method("GET"))
            .and(path(resource))
            .and(query_param("access_key", TEST_ACCESS_KEY))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .expect(times)
            .mount(&self.server)
            .await;
    }

    /// Mock a successful /flights response
    pub async fn mock_flights_success(&self, body: Value) {
        Mock::given(method("GET"))
            .and(path("/flights"))
            .and(query_param("access_key", TEST_ACCESS_KEY))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(&self.server)
            .await;
    }

    /// Mock a successful catalog response on /airports or /airlines
    pub async fn mock_catalog_success(&self, resource: &str, body: Value) {
        Mock::given(method("GET"))
            .and(path(resource))
            .and(query_param("access_key", TEST_ACCESS_KEY))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(&self.server)
            .await;
    }

    /// Mock a successful /flights response delivered after `delay`
    pub async fn mock_flights_slow(&self, body: Value, delay: Duration) {
        Mock::given(method("GET"))
            .and(path("/flights"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(body)
                    .set_delay(delay),
            )
            .mount(&self.server)
            .await;
    }

    // =========================================================================
    // Error responses
    // =========================================================================

    /// Mock an HTTP error status with a provider error body
    pub async fn mock_error_status(&self, resource: &str, status: u16, code: &str) {
        Mock::given(method("GET"))
            .and(path(resource))
            .respond_with(ResponseTemplate::new(status).set_body_json(
                AviationstackTestData::error_body(code, "The requested resource does not exist."),
            ))
            .mount(&self.server)
            .await;
    }

    /// Mock a 200 response whose body reports a provider error
    pub async fn mock_embedded_error(&self, resource: &str, code: &str) {
        Mock::given(method("GET"))
            .and(path(resource))
            .respond_with(ResponseTemplate::new(200).set_body_json(
                AviationstackTestData::error_body(code, "Your monthly usage limit has been reached."),
            ))
            .mount(&self.server)
            .await;
    }

    /// Mock a 200 response that is not JSON
    pub async fn mock_malformed(&self, resource: &str) {
        Mock::given(method("GET"))
            .and(path(resource))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"))
            .mount(&self.server)
            .await;
    }
}

/// Sample provider payloads
pub struct AviationstackTestData;

impl AviationstackTestData {
    pub fn delta_89() -> Value {
        json!({
            "pagination": { "limit": 12, "offset": 0, "count": 1, "total": 1 },
            "data": [{
                "flight_date": "2025-08-15",
                "flight_status": "active",
                "departure": { "airport": "Hartsfield-Jackson Atlanta", "iata": "ATL" },
                "arrival": { "airport": "Los Angeles International", "iata": "LAX" },
                "airline": { "name": "Delta Air Lines", "iata": "DL" },
                "flight": { "number": "89", "iata": "DL89" }
            }]
        })
    }

    pub fn airports(search: &str) -> Value {
        json!({
            "pagination": { "limit": 10, "offset": 0, "count": 1, "total": 1 },
            "data": [{
                "airport_name": format!("{} International", search),
                "iata_code": "JFK",
                "country_name": "United States"
            }]
        })
    }

    pub fn airlines() -> Value {
        json!({
            "pagination": { "limit": 10, "offset": 0, "count": 1, "total": 1 },
            "data": [{ "airline_name": "KLM", "iata_code": "KL", "status": "active" }]
        })
    }

    pub fn error_body(code: &str, message: &str) -> Value {
        json!({ "error": { "code": code, "message": message } })
    }
}
