//! HTTP client implementation

use crate::config::HttpConfig;
use crate::errors::HttpError;
use crate::types::{RequestSpec, ResponseSummary};
use reqwest::Client;
use std::time::Instant;
use tracing::{debug, trace};

/// Sends a single load request and reports how it completed
#[async_trait::async_trait]
pub trait RequestSender: Send + Sync {
    async fn send(&self, request: &RequestSpec) -> Result<ResponseSummary, HttpError>;
}

/// HTTP manager holding one pooled reqwest client for the whole process
#[derive(Debug, Clone)]
pub struct HttpManager {
    client: Client,
    config: HttpConfig,
}

impl HttpManager {
    /// Create a new HttpManager with default configuration
    pub fn new() -> Result<Self, HttpError> {
        Self::with_config(HttpConfig::default())
    }

    /// Create a new HttpManager with specific configuration
    pub fn with_config(config: HttpConfig) -> Result<Self, HttpError> {
        debug!(
            "Creating HttpManager with timeout: {}ms, pool size per host: {}",
            config.timeout.as_millis(),
            config.max_idle_per_host
        );

        let client = Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .user_agent(&config.user_agent)
            .danger_accept_invalid_certs(!config.verify_ssl)
            .redirect(reqwest::redirect::Policy::limited(
                config.max_redirects as usize,
            ))
            .pool_max_idle_per_host(config.max_idle_per_host)
            .pool_idle_timeout(config.idle_timeout)
            .build()
            .map_err(|e| HttpError::ConfigError(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self { client, config })
    }

    pub fn config(&self) -> &HttpConfig {
        &self.config
    }

    fn transport_error(&self, e: reqwest::Error) -> HttpError {
        if e.is_timeout() {
            HttpError::Timeout(self.config.timeout)
        } else {
            HttpError::NetworkError(e)
        }
    }
}

#[async_trait::async_trait]
impl RequestSender for HttpManager {
    async fn send(&self, request: &RequestSpec) -> Result<ResponseSummary, HttpError> {
        let url = reqwest::Url::parse(&request.url)
            .map_err(|e| HttpError::InvalidUrl(format!("{}: {}", request.url, e)))?;

        trace!("Sending {} {}", request.method, url);

        let mut builder = self.client.request(request.method.into(), url);
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let started = Instant::now();
        let response = builder.send().await.map_err(|e| self.transport_error(e))?;

        let status = response.status().as_u16();
        // A body cut short after the headers is a failed call too
        response.bytes().await.map_err(|e| self.transport_error(e))?;

        Ok(ResponseSummary {
            status,
            latency: started.elapsed(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::HttpMethod;
    use axum::{routing::any, Router};
    use std::time::Duration;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    async fn spawn_stub() -> String {
        let app = Router::new()
            .route("/ok", any(|| async { "ok" }))
            .route(
                "/missing",
                any(|| async { (axum::http::StatusCode::NOT_FOUND, "nope") }),
            )
            .route(
                "/slow",
                any(|| async {
                    tokio::time::sleep(Duration::from_secs(2)).await;
                    "late"
                }),
            );

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}", addr)
    }

    /// Announces a 1000 byte body, sends three bytes and hangs up
    async fn spawn_truncating_server() -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            while let Ok((mut socket, _)) = listener.accept().await {
                let mut buf = [0u8; 4096];
                let _ = socket.read(&mut buf).await;
                let _ = socket
                    .write_all(b"HTTP/1.1 200 OK\r\nContent-Length: 1000\r\n\r\nabc")
                    .await;
                let _ = socket.shutdown().await;
            }
        });
        format!("http://{}", addr)
    }

    #[tokio::test]
    async fn test_send_reports_status() {
        let base = spawn_stub().await;
        let manager = HttpManager::new().unwrap();

        let ok = manager
            .send(&RequestSpec::new(HttpMethod::Get, format!("{}/ok", base)))
            .await
            .unwrap();
        assert_eq!(ok.status, 200);
        assert!(ok.is_success_status());

        let missing = manager
            .send(
                &RequestSpec::new(HttpMethod::Post, format!("{}/missing", base))
                    .with_body(serde_json::json!({"a": 1})),
            )
            .await
            .unwrap();
        assert_eq!(missing.status, 404);
        assert!(!missing.is_success_status());
    }

    #[tokio::test]
    async fn test_send_times_out() {
        let base = spawn_stub().await;
        let manager =
            HttpManager::with_config(HttpConfig::default().with_timeout(Duration::from_millis(200)))
                .unwrap();

        let err = manager
            .send(&RequestSpec::new(HttpMethod::Get, format!("{}/slow", base)))
            .await
            .unwrap_err();
        assert!(err.is_timeout());
    }

    #[tokio::test]
    async fn test_send_rejects_bad_url() {
        let manager = HttpManager::new().unwrap();
        let err = manager
            .send(&RequestSpec::new(HttpMethod::Get, "not a url"))
            .await
            .unwrap_err();
        assert!(matches!(err, HttpError::InvalidUrl(_)));
    }

    #[tokio::test]
    async fn test_truncated_body_is_a_failure() {
        let base = spawn_truncating_server().await;
        let manager = HttpManager::new().unwrap();

        let err = manager
            .send(&RequestSpec::new(HttpMethod::Get, format!("{}/partial", base)))
            .await
            .unwrap_err();
        assert!(matches!(err, HttpError::NetworkError(_)));
        assert!(!err.is_timeout());
    }
}
