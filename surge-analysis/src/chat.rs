//! OpenAI-compatible chat completions analyzer

use crate::error::AnalysisError;
use crate::prompt::{build_prompt, SYSTEM_PROMPT};
use crate::ReportAnalyzer;
use reqwest::Client;
use serde_json::{json, Value as JsonValue};
use std::time::Duration;
use surge_config::AnalysisConfig;
use surge_core::Report;
use tracing::{debug, warn};

/// Sends reports to `{api_url}/chat/completions`
#[derive(Clone)]
pub struct ChatCompletionsAnalyzer {
    client: Client,
    api_url: String,
    model: String,
    api_key: String,
    timeout: Duration,
}

impl ChatCompletionsAnalyzer {
    /// Build from configuration; fails when no API key is set
    pub fn from_config(config: &AnalysisConfig) -> Result<Self, AnalysisError> {
        let api_key = config
            .api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
            .ok_or(AnalysisError::NotConfigured)?;

        let client = Client::builder().timeout(config.timeout).build()?;

        Ok(Self {
            client,
            api_url: config.api_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            api_key: api_key.to_string(),
            timeout: config.timeout,
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.api_url)
    }
}

impl std::fmt::Debug for ChatCompletionsAnalyzer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatCompletionsAnalyzer")
            .field("api_url", &self.api_url)
            .field("model", &self.model)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

#[async_trait::async_trait]
impl ReportAnalyzer for ChatCompletionsAnalyzer {
    async fn analyze(
        &self,
        report: &Report,
        question: Option<&str>,
    ) -> Result<String, AnalysisError> {
        let request_body = json!({
            "model": self.model,
            "messages": [
                { "role": "system", "content": SYSTEM_PROMPT },
                { "role": "user", "content": build_prompt(report, question) }
            ],
            "stream": false
        });

        debug!("Requesting analysis of report {} from {}", report.id, self.model);

        let response = self
            .client
            .post(self.endpoint())
            .bearer_auth(&self.api_key)
            .json(&request_body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    AnalysisError::Timeout(self.timeout)
                } else {
                    AnalysisError::Request(e)
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!("Analysis API returned {}", status);
            return Err(AnalysisError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let response_json: JsonValue = response
            .json()
            .await
            .map_err(|e| AnalysisError::InvalidResponse(e.to_string()))?;

        response_json["choices"][0]["message"]["content"]
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| {
                AnalysisError::InvalidResponse("missing choices[0].message.content".to_string())
            })
    }
}
