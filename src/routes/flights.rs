//! Flights endpoint
//!
//! Proxies Aviationstack `/flights` lookups. The only endpoint whose response
//! reports the monthly quota.

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

/// Flight search filters
#[derive(Debug, Default, Clone, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct FlightQuery {
    /// Airline name, e.g. `Delta Air Lines`
    pub airline_name: Option<String>,
    /// Airline IATA code, e.g. `DL`
    pub airline_iata: Option<String>,
    /// Flight number without the airline prefix
    pub flight_number: Option<String>,
    /// Departure airport IATA code
    pub dep_iata: Option<String>,
    /// Arrival airport IATA code
    pub arr_iata: Option<String>,
    /// Page size (defaults to 10)
    pub limit: Option<String>,
}

impl FlightQuery {
    pub fn filters(&self) -> Filters {
        Filters::from_pairs(
            ResourceKind::Flights,
            [
                ("airline_name", self.airline_name.as_deref()),
                ("airline_iata", self.airline_iata.as_deref()),
                ("flight_number", self.flight_number.as_deref()),
                ("dep_iata", self.dep_iata.as_deref()),
                ("arr_iata", self.arr_iata.as_deref()),
                ("limit", self.limit.as_deref()),
            ],
        )
    }
}

/// Search flights
#[utoipa::path(
    get,
    path = "/flights",
    tag = "Flights",
    params(FlightQuery),
    responses(
        (status = 200, description = "Flight data, possibly from cache", body = ProxyResponse),
        (status = 429, description = "Monthly quota exhausted", body = ErrorResponse),
        (status = 500, description = "Missing credential or provider failure", body = ErrorResponse)
    )
)]
pub async fn search_flights(
    State(state): State<Arc<AppState>>,
    query: Result<Query<FlightQuery>, QueryRejection>,
) -> AppResult<Json<ProxyResponse>> {
    let started = Instant::now();
    let Query(query) = query.map_err(|e| AppError::BadRequest(e.body_text()))?;

    let result = state.proxy.handle(query.filters()).await;
    finish(ResourceKind::Flights, started, result)
}
