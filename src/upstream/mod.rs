//! Upstream flight-data provider integration
//!
//! Provides the Aviationstack client and the request/error models shared by
//! the proxy.

pub mod client;
pub mod models;

pub use client::{AviationstackClient, FlightDataProvider};
pub use models::*;
