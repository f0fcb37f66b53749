//! REST API request handlers

pub mod analysis;
pub mod health;
pub mod reports;
pub mod resources;
pub mod tests;

pub use analysis::analyze_report;
pub use health::health_check;
pub use reports::list_reports;
pub use resources::get_resources;
pub use tests::{get_stats, start_test, stop_test};
