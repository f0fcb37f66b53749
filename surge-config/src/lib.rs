//! Domain-driven configuration management for Surge
//!
//! Configuration is split by functional domain (engine, http, logging,
//! server, analysis). Every domain has defaults, validation, and can be
//! overridden through `SURGE_*` environment variables.

pub mod domains;
pub mod error;
pub mod loader;
pub mod validation;

// Re-export main types
pub use error::{ConfigError, ConfigResult};
pub use loader::ConfigLoader;

// Re-export domain configurations
pub use domains::{
    analysis::AnalysisConfig, engine::EngineConfig, http::HttpConfig, logging::LoggingConfig,
    server::ServerConfig, SurgeConfig,
};

// Re-export utilities
pub use domains::utils::{serde_duration, serde_duration_millis};
