//! Run configuration and its validation

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use surge_http::{HttpMethod, RequestSpec};

/// Raw, unvalidated run configuration as submitted by a caller
///
/// Every field is optional so that a missing field is reported as a
/// [`ConfigError`] instead of a deserialization failure. Numbers are signed
/// so that `0` and negative values reach validation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestConfigRequest {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub method: Option<String>,
    #[serde(default)]
    pub concurrency: Option<i64>,
    /// Duration in seconds
    #[serde(default)]
    pub duration: Option<i64>,
    /// Either raw JSON text or an already structured JSON value
    #[serde(default)]
    pub body: Option<JsonValue>,
}

/// Upper bounds a configuration is checked against
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConfigLimits {
    pub max_concurrency: u32,
    pub max_duration_secs: u64,
}

impl Default for ConfigLimits {
    fn default() -> Self {
        Self {
            max_concurrency: u32::MAX,
            max_duration_secs: u64::MAX,
        }
    }
}

/// Validated, immutable configuration of one run
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TestConfig {
    url: String,
    method: HttpMethod,
    #[serde(skip_serializing_if = "Option::is_none")]
    body: Option<JsonValue>,
    concurrency: u32,
    duration_secs: u64,
}

impl TestConfig {
    /// Validate a raw request without any upper bounds
    pub fn new(request: TestConfigRequest) -> Result<Self, ConfigError> {
        Self::from_request(request, ConfigLimits::default())
    }

    /// Validate a raw request against the given limits
    pub fn from_request(
        request: TestConfigRequest,
        limits: ConfigLimits,
    ) -> Result<Self, ConfigError> {
        let url = validate_url(request.url)?;

        let method = match request.method.as_deref().map(str::trim) {
            None | Some("") => HttpMethod::Get,
            Some(raw) => raw
                .parse::<HttpMethod>()
                .map_err(|_| ConfigError::UnsupportedMethod(raw.to_string()))?,
        };

        let concurrency = positive(request.concurrency, "concurrency")?;
        if concurrency > u64::from(limits.max_concurrency) {
            return Err(ConfigError::LimitExceeded {
                field: "concurrency",
                value: concurrency,
                limit: u64::from(limits.max_concurrency),
            });
        }

        let duration_secs = positive(request.duration, "duration")?;
        if duration_secs > limits.max_duration_secs {
            return Err(ConfigError::LimitExceeded {
                field: "duration",
                value: duration_secs,
                limit: limits.max_duration_secs,
            });
        }

        let body = parse_body(request.body, method)?;

        Ok(Self {
            url,
            method,
            body,
            // Bounded by max_concurrency, itself a u32
            concurrency: u32::try_from(concurrency).unwrap_or(u32::MAX),
            duration_secs,
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn method(&self) -> HttpMethod {
        self.method
    }

    pub fn body(&self) -> Option<&JsonValue> {
        self.body.as_ref()
    }

    /// Requests launched per tick
    pub fn concurrency(&self) -> u32 {
        self.concurrency
    }

    pub fn duration_secs(&self) -> u64 {
        self.duration_secs
    }

    pub fn duration(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.duration_secs)
    }

    /// The request every dispatched call sends
    pub fn request_spec(&self) -> RequestSpec {
        RequestSpec {
            method: self.method,
            url: self.url.clone(),
            body: self.body.clone(),
        }
    }
}

impl TryFrom<TestConfigRequest> for TestConfig {
    type Error = ConfigError;

    fn try_from(request: TestConfigRequest) -> Result<Self, Self::Error> {
        Self::new(request)
    }
}

fn validate_url(url: Option<String>) -> Result<String, ConfigError> {
    let url = url
        .map(|u| u.trim().to_string())
        .filter(|u| !u.is_empty())
        .ok_or(ConfigError::MissingField("url"))?;

    let parsed = url::Url::parse(&url).map_err(|e| ConfigError::InvalidUrl {
        url: url.clone(),
        reason: e.to_string(),
    })?;

    match parsed.scheme() {
        "http" | "https" => {}
        other => {
            return Err(ConfigError::InvalidUrl {
                url,
                reason: format!("unsupported scheme '{}'", other),
            })
        }
    }

    if parsed.host_str().is_none() {
        return Err(ConfigError::InvalidUrl {
            url,
            reason: "missing host".to_string(),
        });
    }

    Ok(url)
}

fn positive(value: Option<i64>, field: &'static str) -> Result<u64, ConfigError> {
    let value = value.ok_or(ConfigError::MissingField(field))?;
    if value <= 0 {
        return Err(ConfigError::NonPositive { field, value });
    }
    Ok(value as u64)
}

fn parse_body(
    body: Option<JsonValue>,
    method: HttpMethod,
) -> Result<Option<JsonValue>, ConfigError> {
    let body = match body {
        None | Some(JsonValue::Null) => return Ok(None),
        Some(JsonValue::String(raw)) if raw.trim().is_empty() => return Ok(None),
        Some(body) => body,
    };

    if !method.allows_body() {
        return Err(ConfigError::BodyNotAllowed(method));
    }

    match body {
        JsonValue::String(raw) => serde_json::from_str(&raw)
            .map(Some)
            .map_err(|e| ConfigError::MalformedBody(e.to_string())),
        structured => Ok(Some(structured)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn request(url: &str, method: Option<&str>, concurrency: i64, duration: i64) -> TestConfigRequest {
        TestConfigRequest {
            url: Some(url.to_string()),
            method: method.map(str::to_string),
            concurrency: Some(concurrency),
            duration: Some(duration),
            body: None,
        }
    }

    #[test]
    fn test_valid_config_defaults_to_get() {
        let config = TestConfig::new(request("https://example.test/ok", None, 5, 2)).unwrap();
        assert_eq!(config.url(), "https://example.test/ok");
        assert_eq!(config.method(), HttpMethod::Get);
        assert_eq!(config.concurrency(), 5);
        assert_eq!(config.duration_secs(), 2);
        assert!(config.body().is_none());
    }

    #[test]
    fn test_method_is_case_insensitive() {
        let config = TestConfig::new(request("http://localhost/x", Some("delete"), 1, 1)).unwrap();
        assert_eq!(config.method(), HttpMethod::Delete);

        let err = TestConfig::new(request("http://localhost/x", Some("PATCH"), 1, 1)).unwrap_err();
        assert_eq!(err, ConfigError::UnsupportedMethod("PATCH".to_string()));
    }

    #[test]
    fn test_missing_and_non_positive_fields() {
        let mut req = request("http://localhost/x", None, 0, 2);
        assert_eq!(
            TestConfig::new(req.clone()).unwrap_err(),
            ConfigError::NonPositive {
                field: "concurrency",
                value: 0
            }
        );

        req.concurrency = Some(3);
        req.duration = Some(-1);
        assert!(matches!(
            TestConfig::new(req.clone()).unwrap_err(),
            ConfigError::NonPositive {
                field: "duration",
                ..
            }
        ));

        req.duration = None;
        assert_eq!(
            TestConfig::new(req.clone()).unwrap_err(),
            ConfigError::MissingField("duration")
        );

        req.url = Some("   ".to_string());
        assert_eq!(
            TestConfig::new(req).unwrap_err(),
            ConfigError::MissingField("url")
        );
    }

    #[test]
    fn test_invalid_urls_are_rejected() {
        for url in ["not a url", "ftp://example.test/file", "/relative/path"] {
            let err = TestConfig::new(request(url, None, 1, 1)).unwrap_err();
            assert!(matches!(err, ConfigError::InvalidUrl { .. }), "{}", url);
        }
    }

    #[test]
    fn test_limits_are_enforced() {
        let limits = ConfigLimits {
            max_concurrency: 10,
            max_duration_secs: 60,
        };

        let err =
            TestConfig::from_request(request("http://localhost/", None, 11, 5), limits).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::LimitExceeded {
                field: "concurrency",
                value: 11,
                limit: 10
            }
        ));

        let err =
            TestConfig::from_request(request("http://localhost/", None, 10, 61), limits).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::LimitExceeded {
                field: "duration",
                ..
            }
        ));

        assert!(TestConfig::from_request(request("http://localhost/", None, 10, 60), limits).is_ok());
    }

    #[test]
    fn test_body_rules() {
        let mut req = request("http://localhost/items", Some("GET"), 1, 1);
        req.body = Some(json!("{\"a\": 1}"));
        assert_eq!(
            TestConfig::new(req.clone()).unwrap_err(),
            ConfigError::BodyNotAllowed(HttpMethod::Get)
        );

        // Blank bodies count as absent, whatever the method
        req.body = Some(json!("   "));
        assert!(TestConfig::new(req.clone()).unwrap().body().is_none());

        req.method = Some("POST".to_string());
        req.body = Some(json!("{\"name\": \"widget\"}"));
        let config = TestConfig::new(req.clone()).unwrap();
        assert_eq!(config.body(), Some(&json!({"name": "widget"})));
        assert_eq!(config.request_spec().body, Some(json!({"name": "widget"})));

        req.body = Some(json!("{name: widget"));
        assert!(matches!(
            TestConfig::new(req.clone()).unwrap_err(),
            ConfigError::MalformedBody(_)
        ));

        req.method = Some("put".to_string());
        req.body = Some(json!({"already": "structured"}));
        assert_eq!(
            TestConfig::new(req).unwrap().body(),
            Some(&json!({"already": "structured"}))
        );
    }

    #[test]
    fn test_request_deserializes_from_camel_case_json() {
        let req: TestConfigRequest = serde_json::from_value(json!({
            "url": "http://localhost:8080/",
            "method": "post",
            "concurrency": 4,
            "duration": 10,
            "body": "{\"k\": true}"
        }))
        .unwrap();

        let config = TestConfig::try_from(req).unwrap();
        assert_eq!(config.method(), HttpMethod::Post);
        assert_eq!(config.duration(), std::time::Duration::from_secs(10));
    }
}
