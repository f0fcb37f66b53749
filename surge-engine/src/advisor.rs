//! Host resource sampling and concurrency suggestion

use serde::Serialize;
use sysinfo::{CpuRefreshKind, MemoryRefreshKind, RefreshKind, System};
use thiserror::Error;
use tracing::debug;

/// Virtual users assumed per logical core
const USERS_PER_CORE: f64 = 50.0;
/// Fraction of theoretical capacity the suggestion aims for
const CAPACITY_FACTOR: f64 = 0.8;

const BYTES_PER_GB: f64 = 1024.0 * 1024.0 * 1024.0;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum AdvisorError {
    #[error("Host metrics unavailable: {0}")]
    MetricsUnavailable(String),
}

/// Host metrics read at request time
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceSnapshot {
    pub cpu_usage_percent: f64,
    pub free_memory_percent: f64,
    pub total_memory_gb: f64,
    pub logical_core_count: usize,
    pub suggested_concurrency: u64,
}

/// `floor(cores * 50 * 0.8)`
pub fn suggested_concurrency(logical_cores: usize) -> u64 {
    (logical_cores as f64 * USERS_PER_CORE * CAPACITY_FACTOR).floor() as u64
}

/// Reads host CPU and memory. Holds no state between calls.
#[derive(Debug, Clone, Copy, Default)]
pub struct ResourceAdvisor;

impl ResourceAdvisor {
    pub fn new() -> Self {
        Self
    }

    /// Sample the host
    ///
    /// Blocks for [`sysinfo::MINIMUM_CPU_UPDATE_INTERVAL`] to get a CPU usage
    /// reading; call it from a blocking context.
    pub fn sample(&self) -> Result<ResourceSnapshot, AdvisorError> {
        let mut system = System::new_with_specifics(
            RefreshKind::nothing()
                .with_cpu(CpuRefreshKind::everything())
                .with_memory(MemoryRefreshKind::everything()),
        );

        std::thread::sleep(sysinfo::MINIMUM_CPU_UPDATE_INTERVAL);
        system.refresh_cpu_usage();

        let snapshot = Self::from_readings(
            f64::from(system.global_cpu_usage()),
            system.total_memory(),
            system.available_memory(),
            system.cpus().len(),
        )?;

        debug!(
            "Sampled host: {} cores, {:.1}% cpu, {:.1}% free memory",
            snapshot.logical_core_count, snapshot.cpu_usage_percent, snapshot.free_memory_percent
        );
        Ok(snapshot)
    }

    /// Derive a snapshot from raw readings (memory in bytes)
    pub fn from_readings(
        cpu_usage_percent: f64,
        total_memory: u64,
        available_memory: u64,
        logical_cores: usize,
    ) -> Result<ResourceSnapshot, AdvisorError> {
        if logical_cores == 0 {
            return Err(AdvisorError::MetricsUnavailable(
                "no logical cores reported".to_string(),
            ));
        }
        if total_memory == 0 {
            return Err(AdvisorError::MetricsUnavailable(
                "total memory reported as zero".to_string(),
            ));
        }

        let free_memory_percent =
            (available_memory.min(total_memory) as f64 / total_memory as f64) * 100.0;

        Ok(ResourceSnapshot {
            cpu_usage_percent: round2(cpu_usage_percent.clamp(0.0, 100.0)),
            free_memory_percent: round2(free_memory_percent),
            total_memory_gb: round2(total_memory as f64 / BYTES_PER_GB),
            logical_core_count: logical_cores,
            suggested_concurrency: suggested_concurrency(logical_cores),
        })
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
