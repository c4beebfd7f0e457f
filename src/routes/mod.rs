//! HTTP routes for Flightdeck
//!
//! This module defines all HTTP endpoints exposed by the proxy.

pub mod catalog;
pub mod docs;
pub mod flights;
pub mod health;
pub mod metrics;

use std::sync::Arc;
use std::time::Instant;

use axum::{routing::get, Json, Router};
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::{
    error::AppResult,
    proxy::ProxyResponse,
    routes::metrics::record_request,
    upstream::ResourceKind,
    AppState,
};

/// Create the main application router
pub fn create_router(state: Arc<AppState>) -> Router {
    // The browser client calls the proxy cross-origin
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let proxy_routes = Router::new()
        .route("/flights", get(flights::search_flights))
        .route("/airports", get(catalog::search_airports))
        .route("/airlines", get(catalog::search_airlines));

    let public_routes = Router::new()
        .route("/health", get(health::health_check))
        .route("/health/ready", get(health::readiness_check))
        .route("/health/live", get(health::liveness_check))
        .route("/metrics", get(metrics::prometheus_metrics))
        .route("/docs/openapi.json", get(docs::openapi_json));

    Router::new()
        .merge(public_routes)
        .merge(proxy_routes)
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Record the outcome of one proxy request and wrap it for axum
pub(crate) fn finish(
    kind: ResourceKind,
    started: Instant,
    result: AppResult<ProxyResponse>,
) -> AppResult<Json<ProxyResponse>> {
    let outcome = match &result {
        Ok(response) if response.cached => "hit",
        Ok(_) => "miss",
        Err(e) => e.outcome(),
    };
    record_request(kind, outcome, started.elapsed().as_secs_f64());

    result.map(Json)
}
