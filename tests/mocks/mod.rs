//! Mock infrastructure for testing external services
//!
//! Flightdeck talks to a single external dependency, the Aviationstack API.
//! The mock supports success payloads, HTTP error statuses, provider errors
//! embedded in 2xx bodies and slow responses.

pub mod aviationstack;

pub use aviationstack::*;
