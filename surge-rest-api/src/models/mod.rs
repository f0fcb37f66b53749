//! Request and response models

pub mod analysis;
pub mod common;
pub mod tests;

pub use analysis::{AnalyzeRequest, AnalyzeResponse};
pub use common::{ErrorResponse, HealthResponse, MessageResponse};
pub use tests::{StartTestResponse, StopTestResponse};
