//! Report analysis endpoint

use axum::{extract::rejection::JsonRejection, extract::State, Json};
use surge_analysis::AnalysisError;
use tracing::info;

use crate::{
    context::AppContext,
    errors::{RestError, RestResult},
    models::{AnalyzeRequest, AnalyzeResponse},
};

/// Ask the analysis collaborator about a report
///
/// Without a report in the body the most recent stored report is used.
pub async fn analyze_report(
    State(ctx): State<AppContext>,
    payload: Result<Json<AnalyzeRequest>, JsonRejection>,
) -> RestResult<Json<AnalyzeResponse>> {
    let analyzer = ctx.analyzer.clone().ok_or(AnalysisError::NotConfigured)?;

    let Json(request) = payload?;
    let report = match request.report {
        Some(report) => report,
        None => ctx
            .controller
            .report_store()
            .latest()
            .ok_or_else(|| RestError::bad_request("No report to analyze"))?,
    };

    info!("Analyzing report {}", report.id);
    let analysis = analyzer
        .analyze(&report, request.question.as_deref())
        .await?;

    Ok(Json(AnalyzeResponse { analysis }))
}
