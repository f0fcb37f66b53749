//! Analysis payloads

use serde::{Deserialize, Serialize};
use surge_core::Report;

/// Ask for an analysis of `report`, or of the latest stored report
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeRequest {
    #[serde(default)]
    pub report: Option<Report>,
    #[serde(default)]
    pub question: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyzeResponse {
    pub analysis: String,
}
