//! Main application configuration and router setup

use axum::{
    routing::{get, post},
    Router,
};
use surge_config::{domains::server::CorsConfig, ServerConfig};
use tower_http::trace::TraceLayer;

use crate::{context::AppContext, cors::cors_layer_with_config, handlers};

/// Application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Enable CORS middleware
    pub enable_cors: bool,
    /// Enable request tracing
    pub enable_tracing: bool,
    /// API path prefix
    pub api_prefix: String,
    pub cors: CorsConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::from(&ServerConfig::default())
    }
}

impl From<&ServerConfig> for AppConfig {
    fn from(config: &ServerConfig) -> Self {
        Self {
            enable_cors: config.cors.enabled,
            enable_tracing: config.enable_tracing,
            api_prefix: config.api_prefix.clone(),
            cors: config.cors.clone(),
        }
    }
}

/// Create the complete REST API application
pub fn create_rest_app(context: AppContext, config: AppConfig) -> Router {
    let prefix = config.api_prefix.trim_end_matches('/');

    let app = Router::new()
        // Health endpoint (no prefix)
        .route("/health", get(handlers::health_check));

    let app = if prefix.is_empty() {
        app.merge(create_api_router())
    } else {
        app.nest(prefix, create_api_router())
    };

    let mut app = app.with_state(context);

    // Add middleware layers (applied in reverse order)
    if config.enable_cors {
        app = app.layer(cors_layer_with_config(&config.cors));
    }

    if config.enable_tracing {
        app = app.layer(TraceLayer::new_for_http());
    }

    app
}

/// Routes of the load test API
fn create_api_router() -> Router<AppContext> {
    Router::new()
        .route("/resources", get(handlers::get_resources))
        .route("/start-test", post(handlers::start_test))
        .route("/stop-test", post(handlers::stop_test))
        .route("/stats", get(handlers::get_stats))
        .route("/reports", get(handlers::list_reports))
        .route("/analyze-report", post(handlers::analyze_report))
}
