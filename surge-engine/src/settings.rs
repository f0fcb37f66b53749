//! Runtime settings of the engine

use std::time::Duration;
use surge_config::EngineConfig;
use surge_core::ConfigLimits;

/// Settings the controller is built with
#[derive(Debug, Clone, PartialEq)]
pub struct EngineSettings {
    /// Bound on every dispatched call
    pub request_timeout: Duration,
    /// Cadence of batches and throughput samples
    pub tick_interval: Duration,
    pub history_capacity: usize,
    pub report_capacity: usize,
    pub limits: ConfigLimits,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self::from(&EngineConfig::default())
    }
}

impl From<&EngineConfig> for EngineSettings {
    fn from(config: &EngineConfig) -> Self {
        Self {
            request_timeout: config.request_timeout,
            tick_interval: config.tick_interval,
            history_capacity: config.history_capacity,
            report_capacity: config.report_capacity,
            limits: ConfigLimits {
                max_concurrency: config.max_concurrency,
                max_duration_secs: config.max_duration_secs,
            },
        }
    }
}

impl EngineSettings {
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn with_report_capacity(mut self, capacity: usize) -> Self {
        self.report_capacity = capacity;
        self
    }
}
