//! Settings of the client that sends the load requests

use crate::domains::engine::EngineConfig;
use crate::error::{ConfigError, ConfigResult};
use crate::validation::{validate_positive, validate_required_string, Validatable};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Load client configuration
///
/// The per-request timeout is not set here: every dispatched call is bounded
/// by `engine.request_timeout`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    /// Sent with every load request
    pub user_agent: String,

    /// Accept invalid certificates when false, for self-signed test targets
    pub verify_ssl: bool,

    /// Redirect hops followed before a call is answered with the 3xx itself
    pub max_redirects: u32,

    /// TCP/TLS connect budget, at most `engine.request_timeout`
    #[serde(with = "crate::domains::utils::serde_duration")]
    pub connect_timeout: Duration,

    pub pool: PoolConfig,
}

/// Keep-alive pool shared by all batches of a run
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PoolConfig {
    /// Idle connections kept per target host; sized for large batches
    pub max_idle_per_host: usize,

    /// Idle connections older than this are closed
    #[serde(with = "crate::domains::utils::serde_duration")]
    pub idle_timeout: Duration,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            user_agent: format!("Surge/{}", env!("CARGO_PKG_VERSION")),
            verify_ssl: true,
            max_redirects: 10,
            connect_timeout: Duration::from_secs(5),
            pool: PoolConfig::default(),
        }
    }
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            max_idle_per_host: 256,
            idle_timeout: Duration::from_secs(90),
        }
    }
}

impl HttpConfig {
    /// Checks that depend on the engine settings
    ///
    /// A connect timeout above the request timeout can never fire. An idle
    /// timeout shorter than the tick interval only logs a warning: pooled
    /// connections are then closed between batches and every batch reconnects.
    pub fn validate_with_engine(&self, engine: &EngineConfig) -> ConfigResult<()> {
        if self.connect_timeout > engine.request_timeout {
            return Err(self.validation_error(format!(
                "connect_timeout ({}s) exceeds engine.request_timeout ({}s)",
                self.connect_timeout.as_secs(),
                engine.request_timeout.as_secs()
            )));
        }

        if self.pool.idle_timeout < engine.tick_interval {
            tracing::warn!(
                "http.pool.idle_timeout {:?} is shorter than the tick interval {:?}; connections will not be reused between batches",
                self.pool.idle_timeout,
                engine.tick_interval
            );
        }

        Ok(())
    }
}

impl Validatable for HttpConfig {
    fn validate(&self) -> ConfigResult<()> {
        validate_required_string(&self.user_agent, "user_agent", self.domain_name())?;
        validate_positive(
            self.connect_timeout.as_secs(),
            "connect_timeout",
            self.domain_name(),
        )?;
        if self.pool.max_idle_per_host == 0 {
            return Err(ConfigError::DomainError {
                domain: "http.pool".to_string(),
                message: "max_idle_per_host of 0 disables keep-alive for load requests"
                    .to_string(),
            });
        }
        Ok(())
    }

    fn domain_name(&self) -> &'static str {
        "http"
    }
}
