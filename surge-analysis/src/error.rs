//! Analysis error types

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("Report analysis is not configured: set SURGE_ANALYSIS_API_KEY")]
    NotConfigured,

    #[error("Failed to call analysis API: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Analysis API returned {status}: {body}")]
    Api { status: u16, body: String },

    #[error("Invalid analysis API response: {0}")]
    InvalidResponse(String),

    #[error("Analysis API did not answer within {0:?}")]
    Timeout(std::time::Duration),
}
