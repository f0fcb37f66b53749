//! Core domain models and types for Surge
//!
//! This crate holds the vocabulary shared by the engine, the REST layer and
//! the analysis collaborator: what a run is configured with, what a live run
//! looks like, what a finished run leaves behind, and how things fail.

pub mod error;
pub mod report;
pub mod run;
pub mod test_config;

// Re-export commonly used types at the crate root
pub use error::{ConfigError, EngineError, LifecycleError, Result};
pub use report::{Report, StopReason};
pub use run::{RpsSample, RunId, RunSnapshot};
pub use test_config::{ConfigLimits, TestConfig, TestConfigRequest};
pub use surge_http::HttpMethod;
