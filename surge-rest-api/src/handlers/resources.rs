//! Host resources endpoint

use axum::{extract::State, Json};
use surge_engine::ResourceSnapshot;

use crate::{context::AppContext, errors::RestResult, RestError};

/// Sample host CPU and memory and suggest a concurrency
///
/// Sampling blocks for a short CPU measurement window, so it runs on the
/// blocking pool.
pub async fn get_resources(State(ctx): State<AppContext>) -> RestResult<Json<ResourceSnapshot>> {
    let advisor = ctx.advisor;
    let snapshot = tokio::task::spawn_blocking(move || advisor.sample())
        .await
        .map_err(|e| RestError::internal_error(format!("Resource sampling task failed: {}", e)))??;

    Ok(Json(snapshot))
}
