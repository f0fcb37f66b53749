//! Report analysis for Surge
//!
//! A finished [`Report`](surge_core::Report) and an optional question go in,
//! prose comes out. The REST layer only sees the [`ReportAnalyzer`] trait;
//! [`ChatCompletionsAnalyzer`] talks to any OpenAI-compatible API.

pub mod chat;
pub mod error;
pub mod prompt;

pub use chat::ChatCompletionsAnalyzer;
pub use error::AnalysisError;
pub use prompt::build_prompt;

use surge_core::Report;

/// Produces a natural-language analysis of a report
#[async_trait::async_trait]
pub trait ReportAnalyzer: Send + Sync {
    async fn analyze(&self, report: &Report, question: Option<&str>)
        -> Result<String, AnalysisError>;
}
