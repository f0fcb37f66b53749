//! Load test engine for Surge
//!
//! The [`TestController`] owns at most one run at a time. While a run is
//! active a tick task fires a batch of requests through the [`Dispatcher`]
//! once per tick and rolls the previous tick's throughput into the run's
//! [`StatsAggregator`]; a deadline task ends the run after its configured
//! duration. Finished runs are kept in a bounded [`ReportStore`].

pub mod advisor;
pub mod controller;
pub mod dispatch;
pub mod reports;
pub mod settings;
pub mod stats;

pub use advisor::{suggested_concurrency, AdvisorError, ResourceAdvisor, ResourceSnapshot};
pub use controller::{RunStats, StatusView, TestController};
pub use dispatch::Dispatcher;
pub use reports::ReportStore;
pub use settings::EngineSettings;
pub use stats::StatsAggregator;
