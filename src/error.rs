//! Error types for Flightdeck
//!
//! Every handler returns [`AppResult`]; failures are rendered as the
//! `{ "error": string }` envelope with the status mapped here.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use tracing::{error, warn};
use utoipa::ToSchema;

use crate::{
    quota::QuotaExceeded,
    upstream::{ResourceKind, UpstreamError},
};

/// Application-level errors
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Missing AVIATIONSTACK_API_KEY in server environment")]
    MissingCredential,

    #[error(transparent)]
    QuotaExceeded(#[from] QuotaExceeded),

    #[error("Failed to fetch {kind}")]
    Upstream {
        kind: ResourceKind,
        #[source]
        source: UpstreamError,
    },

    #[error("Bad request: {0}")]
    BadRequest(String),
}

impl AppError {
    pub fn upstream(kind: ResourceKind, source: UpstreamError) -> Self {
        AppError::Upstream { kind, source }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::MissingCredential => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::QuotaExceeded(_) => StatusCode::TOO_MANY_REQUESTS,
            AppError::Upstream { source, .. } => match source {
                UpstreamError::Status { status, .. } => StatusCode::from_u16(*status)
                    .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
                UpstreamError::Timeout
                | UpstreamError::Network(_)
                | UpstreamError::Decode(_)
                | UpstreamError::Provider { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            },
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
        }
    }

    /// Short label for metrics
    pub fn outcome(&self) -> &'static str {
        match self {
            AppError::MissingCredential => "missing_credential",
            AppError::QuotaExceeded(_) => "quota_exceeded",
            AppError::Upstream { .. } => "upstream_error",
            AppError::BadRequest(_) => "bad_request",
        }
    }
}

/// Error response body
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        match &self {
            AppError::Upstream { kind, source } => {
                let details = source.details();
                error!(
                    kind = %kind,
                    error_kind = details.kind,
                    upstream_status = ?details.status,
                    raw = ?details.raw,
                    message = %details.message,
                    "Upstream call failed"
                );
            }
            AppError::QuotaExceeded(e) => {
                warn!(month = %e.month, used = e.used, limit = e.limit, "Quota exceeded");
            }
            AppError::MissingCredential => error!("Provider access key is not configured"),
            AppError::BadRequest(msg) => warn!(message = %msg, "Rejected malformed request"),
        }

        let body = ErrorResponse {
            error: self.to_string(),
        };

        (status, Json(body)).into_response()
    }
}

/// Result type alias for convenience
pub type AppResult<T> = Result<T, AppError>;
