//! Aviationstack request and error models

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

/// Default page size when the client does not ask for one
pub const DEFAULT_LIMIT: &str = "10";

/// The three metered resources the proxy exposes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceKind {
    Flights,
    Airports,
    Airlines,
}

impl ResourceKind {
    /// Path segment on both the proxy and the provider
    pub fn path(&self) -> &'static str {
        match self {
            ResourceKind::Flights => "/flights",
            ResourceKind::Airports => "/airports",
            ResourceKind::Airlines => "/airlines",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceKind::Flights => "flights",
            ResourceKind::Airports => "airports",
            ResourceKind::Airlines => "airlines",
        }
    }

    /// Filter names forwarded upstream; everything else is dropped
    pub fn allowed_filters(&self) -> &'static [&'static str] {
        match self {
            ResourceKind::Flights => &[
                "airline_name",
                "airline_iata",
                "flight_number",
                "dep_iata",
                "arr_iata",
                "limit",
            ],
            ResourceKind::Airports | ResourceKind::Airlines => &["search", "limit"],
        }
    }

    /// Only flight responses carry the quota block
    pub fn reports_quota(&self) -> bool {
        matches!(self, ResourceKind::Flights)
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Allow-listed, trimmed filter set for one upstream request
///
/// Also the basis of the cache key: two requests that would produce the same
/// upstream call share a `Filters` value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Filters {
    kind: ResourceKind,
    params: BTreeMap<&'static str, String>,
}

impl Filters {
    /// Build from raw `(name, value)` pairs, keeping only recognized names
    pub fn from_pairs<'a, I>(kind: ResourceKind, pairs: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, Option<&'a str>)>,
    {
        let mut params = BTreeMap::new();

        for (name, value) in pairs {
            let Some(allowed) = kind.allowed_filters().iter().find(|f| **f == name) else {
                continue;
            };
            let Some(value) = value.map(str::trim).filter(|v| !v.is_empty()) else {
                continue;
            };
            params.insert(*allowed, value.to_string());
        }

        params
            .entry("limit")
            .or_insert_with(|| DEFAULT_LIMIT.to_string());

        Self { kind, params }
    }

    pub fn kind(&self) -> ResourceKind {
        self.kind
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.params.get(name).map(String::as_str)
    }

    /// Parameters in a stable order, without the access key
    pub fn params(&self) -> impl Iterator<Item = (&'static str, &str)> {
        self.params.iter().map(|(k, v)| (*k, v.as_str()))
    }

    /// Normalized request identity: path plus sorted query string
    pub fn cache_key(&self) -> String {
        let query = url::form_urlencoded::Serializer::new(String::new())
            .extend_pairs(self.params())
            .finish();
        format!("{}?{}", self.kind.path(), query)
    }
}

/// Failure talking to the provider
#[derive(Debug, Error)]
pub enum UpstreamError {
    #[error("upstream request timed out")]
    Timeout,

    #[error("upstream network error: {0}")]
    Network(String),

    #[error("upstream responded with status {status}")]
    Status { status: u16, body: Option<Value> },

    #[error("upstream response could not be decoded: {0}")]
    Decode(String),

    /// A 2xx response whose body carries the provider's own error object
    #[error("provider reported error {code}: {message}")]
    Provider {
        code: String,
        message: String,
        body: Value,
    },
}

/// Flattened view of an [`UpstreamError`] for logging
#[derive(Debug, Clone, Serialize)]
pub struct UpstreamErrorDetails {
    pub kind: &'static str,
    pub status: Option<u16>,
    pub message: String,
    pub raw: Option<Value>,
}

impl UpstreamError {
    pub fn kind(&self) -> &'static str {
        match self {
            UpstreamError::Timeout => "timeout",
            UpstreamError::Network(_) => "network",
            UpstreamError::Status { .. } => "status",
            UpstreamError::Decode(_) => "decode",
            UpstreamError::Provider { .. } => "provider",
        }
    }

    /// Status reported by the provider, if it answered with a failure status
    pub fn status(&self) -> Option<u16> {
        match self {
            UpstreamError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Body the provider sent back, if any
    pub fn raw(&self) -> Option<&Value> {
        match self {
            UpstreamError::Status { body, .. } => body.as_ref(),
            UpstreamError::Provider { body, .. } => Some(body),
            _ => None,
        }
    }

    pub fn details(&self) -> UpstreamErrorDetails {
        UpstreamErrorDetails {
            kind: self.kind(),
            status: self.status(),
            message: self.to_string(),
            raw: self.raw().cloned(),
        }
    }

    /// Detect a provider error object embedded in a successful response
    pub fn from_embedded(body: &Value) -> Option<Self> {
        let error = body.get("error")?;
        if error.is_null() {
            return None;
        }

        let code = error
            .get("code")
            .and_then(Value::as_str)
            .unwrap_or("unknown")
            .to_string();
        let message = error
            .get("message")
            .and_then(Value::as_str)
            .unwrap_or("no message")
            .to_string();

        Some(UpstreamError::Provider {
            code,
            message,
            body: body.clone(),
        })
    }
}

impl From<reqwest::Error> for UpstreamError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            UpstreamError::Timeout
        } else if e.is_decode() {
            UpstreamError::Decode(e.to_string())
        } else {
            UpstreamError::Network(e.to_string())
        }
    }
}
