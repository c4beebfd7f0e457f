//! Airport and airline lookup endpoints
//!
//! Back the client's autocomplete widgets. Same proxy path as flights, but
//! responses do not carry the quota block.

use std::sync::Arc;
use std::time::Instant;

use axum::{
    extract::{rejection::QueryRejection, Query, State},
    Json,
};
use serde::Deserialize;
use utoipa::IntoParams;

use crate::{
    error::{AppError, AppResult, ErrorResponse},
    proxy::ProxyResponse,
    routes::finish,
    upstream::{Filters, ResourceKind},
    AppState,
};

/// Free-text search filters
#[derive(Debug, Default, Clone, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct SearchQuery {
    /// Name, IATA or ICAO fragment
    pub search: Option<String>,
    /// Page size (defaults to 10)
    pub limit: Option<String>,
}

impl SearchQuery {
    pub fn filters(&self, kind: ResourceKind) -> Filters {
        Filters::from_pairs(
            kind,
            [
                ("search", self.search.as_deref()),
                ("limit", self.limit.as_deref()),
            ],
        )
    }
}

async fn lookup(
    state: &AppState,
    kind: ResourceKind,
    query: Result<Query<SearchQuery>, QueryRejection>,
) -> AppResult<Json<ProxyResponse>> {
    let started = Instant::now();
    let Query(query) = query.map_err(|e| AppError::BadRequest(e.body_text()))?;

    let result = state.proxy.handle(query.filters(kind)).await;
    finish(kind, started, result)
}

/// Search airports
#[utoipa::path(
    get,
    path = "/airports",
    tag = "Catalog",
    params(SearchQuery),
    responses(
        (status = 200, description = "Airport data, possibly from cache", body = ProxyResponse),
        (status = 429, description = "Monthly quota exhausted", body = ErrorResponse),
        (status = 500, description = "Missing credential or provider failure", body = ErrorResponse)
    )
)]
pub async fn search_airports(
    State(state): State<Arc<AppState>>,
    query: Result<Query<SearchQuery>, QueryRejection>,
) -> AppResult<Json<ProxyResponse>> {
    lookup(&state, ResourceKind::Airports, query).await
}

/// Search airlines
#[utoipa::path(
    get,
    path = "/airlines",
    tag = "Catalog",
    params(SearchQuery),
    responses(
        (status = 200, description = "Airline data, possibly from cache", body = ProxyResponse),
        (status = 429, description = "Monthly quota exhausted", body = ErrorResponse),
        (status = 500, description = "Missing credential or provider failure", body = ErrorResponse)
    )
)]
pub async fn search_airlines(
    State(state): State<Arc<AppState>>,
    query: Result<Query<SearchQuery>, QueryRejection>,
) -> AppResult<Json<ProxyResponse>> {
    lookup(&state, ResourceKind::Airlines, query).await
}
