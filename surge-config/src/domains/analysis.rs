//! AI report analysis configuration
//!
//! The API key is never read from or written to a config file. It is only
//! picked up from the environment by the [`ConfigLoader`](crate::ConfigLoader).

use crate::error::ConfigResult;
use crate::validation::{validate_positive, validate_required_string, validate_url, Validatable};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// AI analysis configuration
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Base URL of an OpenAI-compatible API (without `/chat/completions`)
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// Model name sent with each request
    #[serde(default = "default_model")]
    pub model: String,

    /// Timeout for a single analysis call
    #[serde(
        with = "crate::domains::utils::serde_duration",
        default = "default_timeout"
    )]
    pub timeout: Duration,

    /// API credential, environment only
    #[serde(skip)]
    pub api_key: Option<String>,
}

impl std::fmt::Debug for AnalysisConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnalysisConfig")
            .field("api_url", &self.api_url)
            .field("model", &self.model)
            .field("timeout", &self.timeout)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            model: default_model(),
            timeout: default_timeout(),
            api_key: None,
        }
    }
}

impl AnalysisConfig {
    /// Whether a credential is available
    pub fn is_configured(&self) -> bool {
        self.api_key.as_deref().is_some_and(|key| !key.trim().is_empty())
    }
}

impl Validatable for AnalysisConfig {
    fn validate(&self) -> ConfigResult<()> {
        validate_url(&self.api_url, "api_url", self.domain_name())?;
        validate_required_string(&self.model, "model", self.domain_name())?;
        validate_positive(self.timeout.as_secs(), "timeout", self.domain_name())?;
        Ok(())
    }

    fn domain_name(&self) -> &'static str {
        "analysis"
    }
}

// Default value functions
fn default_api_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_timeout() -> Duration {
    Duration::from_secs(60)
}
