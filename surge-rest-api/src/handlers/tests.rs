//! Load test lifecycle endpoints

use axum::{extract::rejection::JsonRejection, extract::State, Json};
use surge_core::TestConfigRequest;
use surge_engine::StatusView;
use tracing::info;

use crate::{
    context::AppContext,
    errors::RestResult,
    models::{StartTestResponse, StopTestResponse},
};

/// Start a run
pub async fn start_test(
    State(ctx): State<AppContext>,
    payload: Result<Json<TestConfigRequest>, JsonRejection>,
) -> RestResult<Json<StartTestResponse>> {
    let Json(request) = payload?;
    let run_id = ctx.controller.start(request)?;
    info!("Load test {} started through the API", run_id);

    Ok(Json(StartTestResponse {
        message: "Load test started successfully.".to_string(),
        run_id,
    }))
}

/// Stop the active run and return its report
pub async fn stop_test(State(ctx): State<AppContext>) -> RestResult<Json<StopTestResponse>> {
    let report = ctx.controller.stop()?;

    let message = match &report {
        Some(_) => "Load test stopped successfully.",
        None => "Load test stopped before any request completed; no report was recorded.",
    };

    Ok(Json(StopTestResponse {
        message: message.to_string(),
        report,
    }))
}

/// Live statistics, or the latest report while idle
pub async fn get_stats(State(ctx): State<AppContext>) -> Json<StatusView> {
    Json(ctx.controller.poll_status())
}
