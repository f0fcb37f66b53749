//! Report history endpoint

use axum::{extract::State, Json};
use surge_core::Report;

use crate::context::AppContext;

/// Most recent reports first
pub async fn list_reports(State(ctx): State<AppContext>) -> Json<Vec<Report>> {
    Json(ctx.controller.reports())
}
