//! Load test engine configuration

use crate::error::ConfigResult;
use crate::validation::{validate_positive, Validatable};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Load test engine configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Timeout applied to every dispatched request
    #[serde(
        with = "crate::domains::utils::serde_duration",
        default = "default_request_timeout"
    )]
    pub request_timeout: Duration,

    /// Cadence at which batches are launched and throughput is sampled
    #[serde(
        with = "crate::domains::utils::serde_duration_millis",
        default = "default_tick_interval"
    )]
    pub tick_interval: Duration,

    /// Number of per-tick throughput samples kept for a run
    #[serde(default = "default_history_capacity")]
    pub history_capacity: usize,

    /// Number of finished reports kept in memory
    #[serde(default = "default_report_capacity")]
    pub report_capacity: usize,

    /// Largest batch size accepted by `start`
    #[serde(default = "default_max_concurrency")]
    pub max_concurrency: u32,

    /// Longest run duration accepted by `start`, in seconds
    #[serde(default = "default_max_duration")]
    pub max_duration_secs: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            request_timeout: default_request_timeout(),
            tick_interval: default_tick_interval(),
            history_capacity: default_history_capacity(),
            report_capacity: default_report_capacity(),
            max_concurrency: default_max_concurrency(),
            max_duration_secs: default_max_duration(),
        }
    }
}

impl Validatable for EngineConfig {
    fn validate(&self) -> ConfigResult<()> {
        validate_positive(
            self.request_timeout.as_millis(),
            "request_timeout",
            self.domain_name(),
        )?;
        validate_positive(
            self.tick_interval.as_millis(),
            "tick_interval",
            self.domain_name(),
        )?;
        validate_positive(self.history_capacity, "history_capacity", self.domain_name())?;
        validate_positive(self.report_capacity, "report_capacity", self.domain_name())?;
        validate_positive(self.max_concurrency, "max_concurrency", self.domain_name())?;
        validate_positive(self.max_duration_secs, "max_duration_secs", self.domain_name())?;
        Ok(())
    }

    fn domain_name(&self) -> &'static str {
        "engine"
    }
}

// Default value functions
fn default_request_timeout() -> Duration {
    Duration::from_secs(5)
}

fn default_tick_interval() -> Duration {
    Duration::from_secs(1)
}

fn default_history_capacity() -> usize {
    120
}

fn default_report_capacity() -> usize {
    3
}

fn default_max_concurrency() -> u32 {
    10_000
}

fn default_max_duration() -> u64 {
    3600
}
