//! Shared state for REST API handlers

use std::sync::Arc;
use surge_analysis::ReportAnalyzer;
use surge_engine::{ResourceAdvisor, TestController};

/// Dependencies handed to every handler
#[derive(Clone)]
pub struct AppContext {
    pub controller: TestController,
    pub advisor: ResourceAdvisor,
    /// `None` when no analysis credential is configured
    pub analyzer: Option<Arc<dyn ReportAnalyzer>>,
}

impl AppContext {
    pub fn new(controller: TestController) -> Self {
        Self {
            controller,
            advisor: ResourceAdvisor::new(),
            analyzer: None,
        }
    }

    pub fn with_analyzer(mut self, analyzer: Arc<dyn ReportAnalyzer>) -> Self {
        self.analyzer = Some(analyzer);
        self
    }
}
