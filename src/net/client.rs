//! Typed request helpers over any `Transport`.

use std::sync::Arc;

use serde::de::DeserializeOwned;

use super::transport::Transport;
use super::types::{ApiRequest, ApiResponse};
use crate::error::ApiError;

/// Cheap-to-clone handle used by every resource client.
#[derive(Clone)]
pub struct ApiClient {
    transport: Arc<dyn Transport>,
}

impl ApiClient {
    #[must_use]
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }

    /// Send and require a 2xx status.
    ///
    /// # Errors
    ///
    /// Returns the transport error, or the classified status error.
    pub async fn execute(&self, request: &ApiRequest) -> Result<ApiResponse, ApiError> {
        let response = self.transport.send(request).await?;
        if !response.is_success() {
            tracing::debug!(request = %request.label(), status = response.status, "request failed");
        }
        response.error_for_status()
    }

    /// Send and decode a JSON body.
    ///
    /// # Errors
    ///
    /// As [`ApiClient::execute`], plus `ApiError::Decode` for a malformed body.
    pub async fn json<T: DeserializeOwned>(&self, request: &ApiRequest) -> Result<T, ApiError> {
        self.execute(request).await?.json()
    }

    /// Send and discard the body (delete-style calls).
    ///
    /// # Errors
    ///
    /// As [`ApiClient::execute`].
    pub async fn empty(&self, request: &ApiRequest) -> Result<(), ApiError> {
        self.execute(request).await.map(|_| ())
    }

    /// Send and return the raw body bytes (file downloads).
    ///
    /// # Errors
    ///
    /// As [`ApiClient::execute`].
    pub async fn bytes(&self, request: &ApiRequest) -> Result<Vec<u8>, ApiError> {
        self.execute(request).await.map(|r| r.body)
    }
}
