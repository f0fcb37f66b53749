//! Structured logging initialisation for Surge
//!
//! Every crate in the workspace logs through `tracing`; this crate installs
//! the global subscriber once, driven by [`LoggingConfig`].

pub mod init;

pub use init::{build_env_filter, init_logging_from_config, init_simple_tracing};
pub use surge_config::LoggingConfig;
