//! # Surge REST API
//!
//! HTTP surface of the load test engine, used by the browser frontend.
//!
//! | route | purpose |
//! |---|---|
//! | `GET {prefix}/resources` | host metrics and a suggested concurrency |
//! | `POST {prefix}/start-test` | start a run |
//! | `POST {prefix}/stop-test` | stop the active run |
//! | `GET {prefix}/stats` | live counters, or the last report while idle |
//! | `GET {prefix}/reports` | the most recent reports |
//! | `POST {prefix}/analyze-report` | natural-language analysis of a report |
//! | `GET /health` | liveness |
//!
//! Handlers share an [`AppContext`] holding the controller, the resource
//! advisor and, when configured, a report analyzer.

pub mod app;
pub mod context;
pub mod cors;
pub mod errors;
pub mod handlers;
pub mod models;

// Re-export commonly used types
pub use app::{create_rest_app, AppConfig};
pub use context::AppContext;
pub use errors::{RestError, RestResult};
pub use models::*;
