//! The single REST client shared by every backend call
//!
//! Diagnosis, history and health requests all go through [`ApiClient`], which
//! joins endpoints onto the configured base URL, tags each request with an
//! `X-Request-Id`, logs latency and maps non-2xx responses into
//! [`DiagnosisError`].

use async_trait::async_trait;
use log::{debug, warn};
use reqwest::{Client, RequestBuilder};
use serde::{de::DeserializeOwned, Serialize};

use super::common::{create_error_context, parse_error_response, REQUEST_ID_HEADER};
use crate::core::{RequestExecutor, ServiceClient};
use crate::error::{DiagnosisError, Result};
use crate::util::{generate_request_id, measure_time_async, sanitize_for_logging, truncate_string};

/// Typed JSON client for the kiosk backend
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: Client,
    base_url: String,
    service: String,
}

impl ApiClient {
    /// Wrap an already configured HTTP client; see [`crate::core::ClientBuilder`]
    pub fn new(http: Client, base_url: impl Into<String>, service: impl Into<String>) -> Self {
        let base_url = base_url.into();
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            service: service.into(),
        }
    }

    /// Absolute URL for an endpoint relative to the base URL
    pub fn url_for(&self, endpoint: &str) -> String {
        format!("{}/{}", self.base_url, endpoint.trim_start_matches('/'))
    }

    async fn dispatch<R>(&self, method: &str, endpoint: &str, request: RequestBuilder) -> Result<R>
    where
        R: DeserializeOwned,
    {
        let request_id = generate_request_id();
        debug!(
            "[{}] {} {} (request {})",
            self.service,
            method,
            sanitize_for_logging(&self.url_for(endpoint)),
            request_id
        );

        let (outcome, elapsed) =
            measure_time_async(|| request.header(REQUEST_ID_HEADER, request_id.as_str()).send()).await;
        let latency_ms = elapsed.as_secs_f64() * 1000.0;

        let response = match outcome {
            Ok(response) => response,
            Err(e) => {
                warn!(
                    "[{}] {} {} failed after {:.2}ms: {}",
                    self.service, method, endpoint, latency_ms, e
                );
                return Err(DiagnosisError::from(e).with_context(create_error_context(
                    &self.service,
                    endpoint,
                    &request_id,
                    None,
                )));
            }
        };

        let status = response.status();
        if !status.is_success() {
            let context = create_error_context(&self.service, endpoint, &request_id, Some(status));
            let err = parse_error_response(context, response).await;
            warn!(
                "[{}] {} {} returned {} after {:.2}ms: {}",
                self.service,
                method,
                endpoint,
                status,
                latency_ms,
                sanitize_for_logging(err.message())
            );
            return Err(err);
        }

        debug!(
            "[{}] {} {} returned {} in {:.2}ms",
            self.service, method, endpoint, status, latency_ms
        );

        let context = create_error_context(&self.service, endpoint, &request_id, Some(status));
        let body = response
            .text()
            .await
            .map_err(|e| DiagnosisError::from(e).with_context(context.clone()))?;

        serde_json::from_str::<R>(&body).map_err(|e| {
            DiagnosisError::parsing(format!(
                "Failed to parse response ({}): {}",
                e,
                truncate_string(&body, 100)
            ))
            .with_context(context)
        })
    }
}

impl ServiceClient for ApiClient {
    fn name(&self) -> &str {
        &self.service
    }

    fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl RequestExecutor for ApiClient {
    async fn get<R>(&self, endpoint: &str) -> Result<R>
    where
        R: DeserializeOwned + Send,
    {
        let request = self.http.get(self.url_for(endpoint));
        self.dispatch("GET", endpoint, request).await
    }

    async fn post<T, R>(&self, endpoint: &str, body: &T) -> Result<R>
    where
        T: Serialize + Send + Sync,
        R: DeserializeOwned + Send,
    {
        let request = self.http.post(self.url_for(endpoint)).json(body);
        self.dispatch("POST", endpoint, request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_join_ignores_extra_slashes() {
        let client = ApiClient::new(Client::new(), "http://localhost:5000/", "diagnosis");
        assert_eq!(client.url_for("/api/diagnose"), "http://localhost:5000/api/diagnose");
        assert_eq!(client.url_for("api/health"), "http://localhost:5000/api/health");
    }
}
