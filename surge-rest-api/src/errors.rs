//! REST API specific error types and conversions

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use surge_analysis::AnalysisError;
use surge_core::EngineError;
use surge_engine::AdvisorError;
use thiserror::Error;
use tracing::{error, warn};

use crate::models::ErrorResponse;

/// REST API specific error type
#[derive(Error, Debug)]
pub enum RestError {
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error(transparent)]
    Advisor(#[from] AdvisorError),

    #[error(transparent)]
    Analysis(#[from] AnalysisError),

    #[error("Internal server error: {0}")]
    InternalError(String),
}

/// Result type for REST operations
pub type RestResult<T> = Result<T, RestError>;

impl RestError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            RestError::BadRequest(_) | RestError::Engine(_) => StatusCode::BAD_REQUEST,
            RestError::Advisor(_) | RestError::InternalError(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            RestError::Analysis(AnalysisError::NotConfigured) => StatusCode::SERVICE_UNAVAILABLE,
            RestError::Analysis(_) => StatusCode::BAD_GATEWAY,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            RestError::BadRequest(_) => "BAD_REQUEST",
            RestError::Engine(e) => e.code(),
            RestError::Advisor(_) => "METRICS_UNAVAILABLE",
            RestError::Analysis(AnalysisError::NotConfigured) => "ANALYSIS_NOT_CONFIGURED",
            RestError::Analysis(_) => "ANALYSIS_FAILED",
            RestError::InternalError(_) => "INTERNAL_ERROR",
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        RestError::BadRequest(message.into())
    }

    pub fn internal_error(message: impl Into<String>) -> Self {
        RestError::InternalError(message.into())
    }
}

impl From<JsonRejection> for RestError {
    fn from(rejection: JsonRejection) -> Self {
        RestError::BadRequest(rejection.body_text())
    }
}

impl IntoResponse for RestError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            error!("{} ({})", self, status);
        } else {
            warn!("{} ({})", self, status);
        }

        let body = ErrorResponse {
            code: self.code().to_string(),
            message: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use surge_core::{ConfigError, LifecycleError};

    #[test]
    fn test_status_mapping() {
        let err = RestError::from(EngineError::from(LifecycleError::NotRunning));
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(err.code(), "NOT_RUNNING");

        let err = RestError::from(EngineError::from(ConfigError::MissingField("url")));
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(err.code(), "INVALID_CONFIG");

        let err = RestError::from(AnalysisError::NotConfigured);
        assert_eq!(err.status_code(), StatusCode::SERVICE_UNAVAILABLE);

        let err = RestError::from(AnalysisError::Api {
            status: 429,
            body: "slow down".to_string(),
        });
        assert_eq!(err.status_code(), StatusCode::BAD_GATEWAY);
        assert!(err.to_string().contains("slow down"));

        let err = RestError::from(AdvisorError::MetricsUnavailable("no cpus".to_string()));
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
