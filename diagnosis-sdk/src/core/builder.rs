//! Client builder implementation
//!
//! Provides a unified builder for the backend REST client.

use std::collections::HashMap;
use std::str::FromStr;
use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::Client as ReqwestClient;

use crate::config::DiagnosisConfig;
use crate::error::{DiagnosisError, Result};
use crate::services::{ApiClient, UserAgent};

/// Unified client builder for backend clients
pub struct ClientBuilder {
    /// Base URL for the service
    base_url: Option<String>,

    /// Name used in logs and error context
    service_name: String,

    /// Custom headers to include with all requests
    custom_headers: HashMap<String, String>,

    /// Request timeout
    timeout: Option<Duration>,

    /// User agent
    user_agent: UserAgent,

    /// Enable response compression
    compression: bool,
}

impl Default for ClientBuilder {
    fn default() -> Self {
        Self {
            base_url: None,
            service_name: "diagnosis".to_string(),
            custom_headers: HashMap::new(),
            timeout: Some(Duration::from_secs(30)),
            user_agent: UserAgent::default(),
            compression: true,
        }
    }
}

impl ClientBuilder {
    /// Create a new client builder with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder preloaded with the backend URL and timeout from `config`
    pub fn from_config(config: &DiagnosisConfig) -> Self {
        Self::new().base_url(&config.base_url).timeout(config.timeout())
    }

    /// Set the base URL for the service
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Set the name used in logs and error context
    pub fn service_name(mut self, name: impl Into<String>) -> Self {
        self.service_name = name.into();
        self
    }

    /// Add a custom header
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.custom_headers.insert(key.into(), value.into());
        self
    }

    /// Set request timeout
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Set user agent
    pub fn user_agent(mut self, user_agent: UserAgent) -> Self {
        self.user_agent = user_agent;
        self
    }

    /// Enable or disable compression
    pub fn compression(mut self, enabled: bool) -> Self {
        self.compression = enabled;
        self
    }

    /// Build an HTTP client with the configured settings
    pub fn build_http_client(&self) -> Result<ReqwestClient> {
        let mut builder = ReqwestClient::builder()
            .user_agent(self.user_agent.to_string())
            .gzip(self.compression);

        if let Some(timeout) = self.timeout {
            builder = builder.timeout(timeout);
        }

        let mut headers = HeaderMap::new();
        for (key, value) in &self.custom_headers {
            let header_name = HeaderName::from_str(key)
                .map_err(|e| DiagnosisError::configuration(format!("Invalid header name: {}", e)))?;

            let header_value = HeaderValue::from_str(value)
                .map_err(|e| DiagnosisError::configuration(format!("Invalid header value: {}", e)))?;

            headers.insert(header_name, header_value);
        }

        builder
            .default_headers(headers)
            .build()
            .map_err(|e| DiagnosisError::configuration(format!("Failed to build HTTP client: {}", e)))
    }

    /// Build the backend REST client
    pub fn build(self) -> Result<ApiClient> {
        let base_url = self
            .base_url
            .clone()
            .ok_or_else(|| DiagnosisError::configuration("Backend base URL is required"))?;

        let parsed = url::Url::parse(&base_url)
            .map_err(|e| DiagnosisError::configuration(format!("Invalid backend URL '{}': {}", base_url, e)))?;
        if parsed.cannot_be_a_base() {
            return Err(DiagnosisError::configuration(format!(
                "Backend URL '{}' cannot be used as a base",
                base_url
            )));
        }

        let http_client = self.build_http_client()?;
        Ok(ApiClient::new(http_client, base_url, self.service_name))
    }
}
