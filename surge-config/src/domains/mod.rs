//! Domain-specific configuration modules

pub mod analysis;
pub mod engine;
pub mod http;
pub mod logging;
pub mod server;
pub mod utils;

use crate::error::ConfigResult;
use crate::validation::Validatable;
use serde::{Deserialize, Serialize};

/// Main Surge configuration combining all domains
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct SurgeConfig {
    /// Load test engine configuration
    #[serde(default)]
    pub engine: engine::EngineConfig,

    /// HTTP client configuration for dispatched requests
    #[serde(default)]
    pub http: http::HttpConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: logging::LoggingConfig,

    /// REST server configuration
    #[serde(default)]
    pub server: server::ServerConfig,

    /// AI report analysis configuration
    #[serde(default)]
    pub analysis: analysis::AnalysisConfig,
}

impl SurgeConfig {
    /// Validate all domain configurations
    pub fn validate_all(&self) -> ConfigResult<()> {
        self.engine.validate()?;
        self.http.validate()?;
        self.http.validate_with_engine(&self.engine)?;
        self.logging.validate()?;
        self.server.validate()?;
        self.analysis.validate()?;
        Ok(())
    }

    /// Generate a sample configuration file
    pub fn generate_sample() -> String {
        let config = SurgeConfig::default();
        serde_yaml::to_string(&config)
            .unwrap_or_else(|_| "# Failed to generate sample config".to_string())
    }
}
