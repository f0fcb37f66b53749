//! REST server configuration

use crate::error::ConfigResult;
use crate::validation::{validate_port_range, validate_required_string, Validatable};
use serde::{Deserialize, Serialize};

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Server bind address
    #[serde(default = "default_bind_address")]
    pub bind_address: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Path prefix for the load test API
    #[serde(default = "default_api_prefix")]
    pub api_prefix: String,

    /// Whether to trace every HTTP request
    #[serde(default = "crate::domains::utils::default_true")]
    pub enable_tracing: bool,

    /// CORS configuration
    #[serde(default)]
    pub cors: CorsConfig,
}

/// CORS configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CorsConfig {
    /// Whether CORS headers are emitted at all
    #[serde(default = "crate::domains::utils::default_true")]
    pub enabled: bool,

    /// Allowed origins, `*` allows any origin
    #[serde(default = "default_cors_origins")]
    pub allowed_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            port: default_port(),
            api_prefix: default_api_prefix(),
            enable_tracing: true,
            cors: CorsConfig::default(),
        }
    }
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            allowed_origins: default_cors_origins(),
        }
    }
}

impl ServerConfig {
    /// `address:port` string suitable for binding a listener
    pub fn socket_address(&self) -> String {
        format!("{}:{}", self.bind_address, self.port)
    }
}

impl Validatable for ServerConfig {
    fn validate(&self) -> ConfigResult<()> {
        validate_required_string(&self.bind_address, "bind_address", self.domain_name())?;
        validate_port_range(self.port, "port", self.domain_name())?;

        if !self.api_prefix.starts_with('/') {
            return Err(self.validation_error(format!(
                "api_prefix must start with '/', got '{}'",
                self.api_prefix
            )));
        }

        self.cors.validate()?;
        Ok(())
    }

    fn domain_name(&self) -> &'static str {
        "server"
    }
}

impl Validatable for CorsConfig {
    fn validate(&self) -> ConfigResult<()> {
        if self.enabled && self.allowed_origins.is_empty() {
            return Err(self.validation_error("allowed_origins cannot be empty when CORS is enabled"));
        }
        Ok(())
    }

    fn domain_name(&self) -> &'static str {
        "server.cors"
    }
}

// Default value functions
fn default_bind_address() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3001
}

fn default_api_prefix() -> String {
    "/api".to_string()
}

fn default_cors_origins() -> Vec<String> {
    vec![
        "http://localhost:3000".to_string(),
        "http://127.0.0.1:3000".to_string(),
    ]
}
