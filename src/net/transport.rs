//! HTTP transport seam and its `reqwest` implementation.
//!
//! ARCHITECTURE
//! ============
//! Everything above this layer talks to `dyn Transport`. `HttpTransport` is
//! the one real sender: a single `reqwest::Client` with the API base URL, a
//! cookie store holding the backend-managed session cookie, and JSON as the
//! default content type. `AuthRetry` decorates it with the renewal policy.

use std::time::Duration;

use reqwest::header::{ACCEPT, CONTENT_TYPE, HeaderMap, HeaderValue};

use super::types::{ApiRequest, ApiResponse};
use crate::config::ConsoleConfig;
use crate::error::ApiError;

/// Sends one request and returns the raw response.
///
/// Implementations return `Err` only when no response was obtained
/// (`ApiError::Transport`); every HTTP status comes back as `Ok`.
#[async_trait::async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: &ApiRequest) -> Result<ApiResponse, ApiError>;
}

pub struct HttpTransport {
    http: reqwest::Client,
    base_url: String,
}

impl HttpTransport {
    /// Build the shared client from config.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Config` if the underlying client cannot be built.
    pub fn new(config: &ConsoleConfig) -> Result<Self, ApiError> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(ACCEPT, HeaderValue::from_static("application/json, */*"));

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .cookie_store(true)
            .timeout(Duration::from_secs(config.timeouts.request_secs))
            .connect_timeout(Duration::from_secs(config.timeouts.connect_secs))
            .build()
            .map_err(|e| ApiError::Config(format!("http client build failed: {e}")))?;

        Ok(Self { http, base_url: config.api_base_url.clone() })
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

#[async_trait::async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: &ApiRequest) -> Result<ApiResponse, ApiError> {
        let mut builder = self.http.request(request.method.clone(), self.url(&request.path));
        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder.send().await?;
        let status = response.status().as_u16();
        let body = response.bytes().await?.to_vec();
        tracing::trace!(request = %request.label(), %status, bytes = body.len(), "http response");

        Ok(ApiResponse { status, body })
    }
}
