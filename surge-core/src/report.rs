//! Finalized run reports

use crate::run::{RpsSample, RunId, RunSnapshot};
use crate::test_config::TestConfig;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use surge_http::HttpMethod;

/// Why a run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    /// `stop()` was called by a client
    Manual,
    /// The configured duration elapsed
    Deadline,
    /// The process was shutting down
    Shutdown,
}

impl StopReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            StopReason::Manual => "manual",
            StopReason::Deadline => "deadline",
            StopReason::Shutdown => "shutdown",
        }
    }
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Immutable summary of a finished run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    pub id: RunId,
    pub url: String,
    pub method: HttpMethod,
    pub concurrency: u32,
    /// Configured duration in seconds
    pub duration: u64,
    pub started_at: DateTime<Utc>,
    pub ended_at: DateTime<Utc>,
    pub total_requests: u64,
    pub successful_requests: u64,
    pub failed_requests: u64,
    /// Completions not yet rolled into `history` when the run was finalized
    #[serde(default)]
    pub current_tick_requests: u64,
    pub history: Vec<RpsSample>,
    /// Fraction in `[0, 1]`
    pub success_rate: f64,
    pub average_rps: f64,
    /// Wall clock time between start and finalization
    pub test_duration_seconds: f64,
    pub stop_reason: StopReason,
}

impl Report {
    /// Build the report for a run from its final snapshot
    ///
    /// `elapsed` is the measured wall clock duration of the run and is the
    /// denominator of `average_rps`.
    pub fn finalize(
        id: RunId,
        config: &TestConfig,
        snapshot: RunSnapshot,
        elapsed: Duration,
        stop_reason: StopReason,
    ) -> Self {
        let success_rate = snapshot.success_rate();
        let test_duration_seconds = elapsed.as_secs_f64();
        let average_rps = if test_duration_seconds > 0.0 {
            snapshot.total_requests as f64 / test_duration_seconds
        } else {
            0.0
        };
        let ended_at = snapshot.ended_at.unwrap_or_else(Utc::now);

        Self {
            id,
            url: config.url().to_string(),
            method: config.method(),
            concurrency: config.concurrency(),
            duration: config.duration_secs(),
            started_at: snapshot.started_at,
            ended_at,
            total_requests: snapshot.total_requests,
            successful_requests: snapshot.successful_requests,
            failed_requests: snapshot.failed_requests,
            current_tick_requests: snapshot.current_tick_requests,
            history: snapshot.history,
            success_rate,
            average_rps,
            test_duration_seconds,
            stop_reason,
        }
    }

    /// Success rate as a percentage, for display
    pub fn success_percent(&self) -> f64 {
        self.success_rate * 100.0
    }

    pub fn is_empty(&self) -> bool {
        self.total_requests == 0
    }
}
