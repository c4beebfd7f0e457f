//! OpenAPI specification for the proxy endpoints

use utoipa::OpenApi;

use crate::{error::ErrorResponse, proxy::ProxyResponse, quota::QuotaSnapshot};

/// OpenAPI specification for the Flightdeck proxy
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Flightdeck API",
        version = "1.0.0",
        description = "Caching, quota-enforcing proxy in front of the Aviationstack flight-data API"
    ),
    paths(
        crate::routes::flights::search_flights,
        crate::routes::catalog::search_airports,
        crate::routes::catalog::search_airlines
    ),
    components(schemas(ProxyResponse, QuotaSnapshot, ErrorResponse)),
    tags(
        (name = "Flights", description = "Flight search"),
        (name = "Catalog", description = "Airport and airline lookup for autocomplete")
    )
)]
pub struct ApiDoc;
