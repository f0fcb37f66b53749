//! Start/stop payloads

use serde::{Deserialize, Serialize};
use surge_core::{Report, RunId};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartTestResponse {
    pub message: String,
    pub run_id: RunId,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StopTestResponse {
    pub message: String,
    /// Absent when the run completed no request
    #[serde(skip_serializing_if = "Option::is_none")]
    pub report: Option<Report>,
}
