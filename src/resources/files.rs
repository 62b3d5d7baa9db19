//! Uploaded assets (menu images). Only removal and URL building live here.

use crate::error::ApiError;
use crate::net::{ApiClient, ApiRequest};

pub const FILES_PATH: &str = "/files";

#[derive(Clone)]
pub struct FilesApi {
    client: ApiClient,
    api_base_url: String,
}

impl FilesApi {
    #[must_use]
    pub fn new(client: ApiClient, api_base_url: impl Into<String>) -> Self {
        Self { client, api_base_url: api_base_url.into() }
    }

    /// Public URL for a stored file.
    #[must_use]
    pub fn file_url(&self, name: &str) -> String {
        format!("{}{FILES_PATH}/{name}", self.api_base_url)
    }

    /// # Errors
    ///
    /// `ApiError::Validation` for an empty or path-like name, otherwise
    /// request errors.
    pub async fn delete(&self, name: &str) -> Result<(), ApiError> {
        if name.trim().is_empty() || name.contains('/') {
            return Err(ApiError::validation("name", "must be a bare file name"));
        }
        self.client.empty(&ApiRequest::delete(format!("{FILES_PATH}/{name}"))).await
    }
}
