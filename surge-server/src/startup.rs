//! Server startup and shutdown logic

use anyhow::{Context, Result};
use axum::Router;
use std::future::Future;
use std::sync::Arc;
use surge_analysis::{ChatCompletionsAnalyzer, ReportAnalyzer};
use surge_config::SurgeConfig;
use surge_engine::{EngineSettings, TestController};
use surge_http::{HttpConfig, HttpManager};
use surge_rest_api::{create_rest_app, AppConfig, AppContext};
use tokio::net::TcpListener;

/// Server application struct
pub struct Server {
    config: SurgeConfig,
    controller: TestController,
    analyzer: Option<Arc<dyn ReportAnalyzer>>,
}

impl Server {
    /// Create a new server instance
    ///
    /// Logging must already be initialised.
    pub fn new(config: SurgeConfig) -> Result<Self> {
        let http_config =
            HttpConfig::from(config.http.clone()).with_timeout(config.engine.request_timeout);
        let manager =
            HttpManager::with_config(http_config).context("Failed to create HTTP client")?;

        let controller =
            TestController::new(Arc::new(manager), EngineSettings::from(&config.engine));

        let analyzer: Option<Arc<dyn ReportAnalyzer>> = if config.analysis.is_configured() {
            let analyzer = ChatCompletionsAnalyzer::from_config(&config.analysis)
                .context("Failed to create report analyzer")?;
            Some(Arc::new(analyzer))
        } else {
            tracing::warn!(
                "SURGE_ANALYSIS_API_KEY is not set; report analysis is disabled, load testing is unaffected"
            );
            None
        };

        Ok(Self {
            config,
            controller,
            analyzer,
        })
    }

    /// Handle to the engine, shared with the router
    pub fn controller(&self) -> TestController {
        self.controller.clone()
    }

    /// Build the complete application router
    pub fn build_app(&self) -> Router {
        let mut context = AppContext::new(self.controller.clone());
        if let Some(analyzer) = &self.analyzer {
            context = context.with_analyzer(Arc::clone(analyzer));
        }

        create_rest_app(context, AppConfig::from(&self.config.server))
    }

    /// Bind the configured address and serve until SIGINT/SIGTERM
    pub async fn start(self) -> Result<()> {
        let addr = self.config.server.socket_address();
        let listener = TcpListener::bind(&addr)
            .await
            .with_context(|| format!("Failed to bind {}", addr))?;

        self.serve(listener, shutdown_signal()).await
    }

    /// Serve on an already bound listener until `shutdown` resolves
    ///
    /// Any run still active afterwards is finalized with reason `shutdown`.
    pub async fn serve<F>(self, listener: TcpListener, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let app = self.build_app();
        let addr = listener.local_addr()?;

        self.log_config_summary();
        tracing::info!("Server listening on {}", addr);

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown)
            .await?;

        if let Some(report) = self.controller.shutdown() {
            tracing::info!(
                "Finalized load test {} on shutdown: {} requests",
                report.id,
                report.total_requests
            );
        }

        tracing::info!("Server shutdown complete");
        Ok(())
    }

    /// Log configuration summary
    fn log_config_summary(&self) {
        let engine = &self.config.engine;
        tracing::info!("=== Surge Server Configuration ===");
        tracing::info!("Bind Address: {}", self.config.server.socket_address());
        tracing::info!("API Prefix: {}", self.config.server.api_prefix);
        tracing::info!(
            "Engine: tick {:?}, request timeout {:?}, keeping {} reports",
            engine.tick_interval,
            engine.request_timeout,
            engine.report_capacity
        );
        tracing::info!(
            "Limits: concurrency <= {}, duration <= {}s",
            engine.max_concurrency,
            engine.max_duration_secs
        );
        tracing::info!(
            "CORS: {}",
            if self.config.server.cors.enabled { "Enabled" } else { "Disabled" }
        );
        tracing::info!(
            "Analysis: {}",
            match &self.analyzer {
                Some(_) => format!("Enabled ({})", self.config.analysis.model),
                None => "Disabled".to_string(),
            }
        );
        tracing::info!("==================================");
    }
}

/// Graceful shutdown signal
pub async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received, starting graceful shutdown...");
}
