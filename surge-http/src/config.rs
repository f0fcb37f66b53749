//! HTTP configuration

use serde::{Deserialize, Serialize};
use std::time::Duration;
use surge_config::domains::http::HttpConfig as ConfigHttpConfig;

/// HTTP client configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    /// Client-side request timeout
    pub timeout: Duration,

    /// Maximum number of redirects to follow
    pub max_redirects: u32,

    /// User agent string
    pub user_agent: String,

    /// Whether to verify SSL certificates
    pub verify_ssl: bool,

    /// Maximum idle connections kept per host
    pub max_idle_per_host: usize,

    /// How long an idle pooled connection is kept
    pub idle_timeout: Duration,

    /// TCP/TLS connect timeout
    pub connect_timeout: Duration,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self::from(ConfigHttpConfig::default())
    }
}

impl From<ConfigHttpConfig> for HttpConfig {
    fn from(config: ConfigHttpConfig) -> Self {
        Self {
            timeout: Duration::from_secs(5),
            max_redirects: config.max_redirects,
            user_agent: config.user_agent,
            verify_ssl: config.verify_ssl,
            max_idle_per_host: config.pool.max_idle_per_host,
            idle_timeout: config.pool.idle_timeout,
            connect_timeout: config.connect_timeout,
        }
    }
}

impl HttpConfig {
    /// Set the client-side request timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}
