//! Core error types for Surge

use surge_http::HttpMethod;
use thiserror::Error;

/// Engine-level error: everything `start`/`stop` can reject synchronously
#[derive(Debug, Error, Clone, PartialEq)]
pub enum EngineError {
    /// The requested run configuration is invalid
    #[error("Invalid test configuration: {0}")]
    Config(#[from] ConfigError),

    /// The request does not fit the controller's current state
    #[error(transparent)]
    Lifecycle(#[from] LifecycleError),
}

impl EngineError {
    /// Stable machine readable code for API responses
    pub fn code(&self) -> &'static str {
        match self {
            EngineError::Config(_) => "INVALID_CONFIG",
            EngineError::Lifecycle(LifecycleError::AlreadyRunning) => "ALREADY_RUNNING",
            EngineError::Lifecycle(LifecycleError::NotRunning) => "NOT_RUNNING",
        }
    }
}

/// Result type alias for engine operations
pub type Result<T> = std::result::Result<T, EngineError>;

/// Rejections of a run configuration
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ConfigError {
    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    #[error("Field '{field}' must be a positive integer, got {value}")]
    NonPositive { field: &'static str, value: i64 },

    #[error("Invalid target URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("Unsupported HTTP method: '{0}'")]
    UnsupportedMethod(String),

    #[error("A request body is not allowed for {0} requests")]
    BodyNotAllowed(HttpMethod),

    #[error("Request body is not valid JSON: {0}")]
    MalformedBody(String),

    #[error("Field '{field}' is {value}, above the limit of {limit}")]
    LimitExceeded {
        field: &'static str,
        value: u64,
        limit: u64,
    },
}

/// Rejections caused by the controller state
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleError {
    #[error("A load test is already running")]
    AlreadyRunning,

    #[error("No load test is currently running")]
    NotRunning,
}
