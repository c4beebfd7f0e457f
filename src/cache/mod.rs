//! Cache module
//!
//! Provides the in-memory response cache that sits in front of the provider.

pub mod response;

pub use self::response::ResponseCache;
