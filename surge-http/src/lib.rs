//! HTTP client functionality for Surge
//!
//! The dispatch loop talks to targets only through the [`RequestSender`]
//! trait; [`HttpManager`] is the reqwest-backed implementation.

pub mod client;
pub mod config;
pub mod errors;
pub mod types;

// Re-export main types for convenience
pub use client::{HttpManager, RequestSender};
pub use config::HttpConfig;
pub use errors::HttpError;
pub use types::{HttpMethod, HttpMethodError, RequestSpec, ResponseSummary};
