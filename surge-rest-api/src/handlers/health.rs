//! Health check endpoint

use axum::{extract::State, response::IntoResponse, Json};
use tracing::debug;

use crate::{context::AppContext, models::HealthResponse};

/// Liveness plus a little engine state
pub async fn health_check(State(ctx): State<AppContext>) -> impl IntoResponse {
    debug!("Health check requested");

    Json(HealthResponse {
        status: "healthy".to_string(),
        timestamp: chrono::Utc::now(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        test_running: ctx.controller.is_running(),
        analysis_enabled: ctx.analyzer.is_some(),
    })
}
