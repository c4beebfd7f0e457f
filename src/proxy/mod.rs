//! Proxy module
//!
//! Orchestrates cache, quota and provider for every resource endpoint.

pub mod service;

pub use service::{ProxyResponse, ProxyService};
