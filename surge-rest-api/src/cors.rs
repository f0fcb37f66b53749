//! CORS layer construction

use axum::http::{header, HeaderValue, Method};
use surge_config::domains::server::CorsConfig;
use tower_http::cors::{Any, CorsLayer};

/// Build a CORS layer from the server configuration
///
/// `*` in `allowed_origins` allows any origin. Origins that are not valid
/// header values are skipped with an error log.
pub fn cors_layer_with_config(config: &CorsConfig) -> CorsLayer {
    let mut cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT, header::AUTHORIZATION]);

    if config.allowed_origins.iter().any(|origin| origin == "*") {
        tracing::warn!("CORS configured to allow any origin");
        cors = cors.allow_origin(Any);
    } else {
        let origins: Vec<HeaderValue> = config
            .allowed_origins
            .iter()
            .filter_map(|origin| match origin.parse::<HeaderValue>() {
                Ok(value) => Some(value),
                Err(e) => {
                    tracing::error!("Invalid origin '{}' in CORS configuration: {}", origin, e);
                    None
                }
            })
            .collect();
        cors = cors.allow_origin(origins);
    }

    cors
}
