//! Generic CRUD access to backend collections.
//!
//! Every resource client sends through an `ApiClient` built on the retrying
//! transport, so an expired session is renewed transparently here and in
//! every wrapper below.

pub mod files;
pub mod menu;
pub mod models;
pub mod shifts;
pub mod users;

use std::fmt;
use std::marker::PhantomData;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::net::{ApiClient, ApiRequest};

pub use files::FilesApi;
pub use menu::MenuApi;
pub use models::*;
pub use shifts::ShiftsApi;
pub use users::UsersApi;

pub const TABLES_PATH: &str = "/admin/tables";
pub const PROMOTIONS_PATH: &str = "/promotions";

/// Backend identifier. Some collections use numeric ids, some use strings.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EntityId {
    Num(i64),
    Text(String),
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Num(n) => write!(f, "{n}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

impl From<i64> for EntityId {
    fn from(n: i64) -> Self {
        Self::Num(n)
    }
}

impl From<&str> for EntityId {
    fn from(s: &str) -> Self {
        s.parse().map_or_else(|_| Self::Text(s.to_owned()), Self::Num)
    }
}

impl From<String> for EntityId {
    fn from(s: String) -> Self {
        Self::from(s.as_str())
    }
}

/// Client-side checks run before any network I/O.
pub trait Validate {
    /// # Errors
    ///
    /// Returns `ApiError::Validation` naming the first offending field.
    fn validate(&self) -> Result<(), ApiError>;
}

pub(crate) fn require(field: &str, value: &str) -> Result<(), ApiError> {
    if value.trim().is_empty() {
        return Err(ApiError::validation(field, "is required"));
    }
    Ok(())
}

/// CRUD over one collection rooted at `base_path`.
pub struct ResourceClient<T> {
    client: ApiClient,
    base_path: String,
    list_path: Option<String>,
    _entity: PhantomData<fn() -> T>,
}

impl<T> Clone for ResourceClient<T> {
    fn clone(&self) -> Self {
        Self {
            client: self.client.clone(),
            base_path: self.base_path.clone(),
            list_path: self.list_path.clone(),
            _entity: PhantomData,
        }
    }
}

impl<T: DeserializeOwned> ResourceClient<T> {
    #[must_use]
    pub fn new(client: ApiClient, base_path: impl Into<String>) -> Self {
        Self { client, base_path: base_path.into(), list_path: None, _entity: PhantomData }
    }

    /// Use a different path for listing (e.g. `/shifts/all`).
    #[must_use]
    pub fn with_list_path(mut self, path: impl Into<String>) -> Self {
        self.list_path = Some(path.into());
        self
    }

    #[must_use]
    pub fn base_path(&self) -> &str {
        &self.base_path
    }

    #[must_use]
    pub fn item_path(&self, id: &EntityId) -> String {
        format!("{}/{id}", self.base_path)
    }

    /// # Errors
    ///
    /// Propagates request and decode errors.
    pub async fn list(&self) -> Result<Vec<T>, ApiError> {
        let path = self.list_path.as_deref().unwrap_or(&self.base_path);
        self.client.json(&ApiRequest::get(path)).await
    }

    /// # Errors
    ///
    /// Propagates request and decode errors.
    pub async fn get(&self, id: &EntityId) -> Result<T, ApiError> {
        self.client.json(&ApiRequest::get(self.item_path(id))).await
    }

    /// Validate, then `POST` to the collection.
    ///
    /// # Errors
    ///
    /// `ApiError::Validation` without a request if the form is invalid,
    /// otherwise request and decode errors.
    pub async fn create<F: Serialize + Validate>(&self, form: &F) -> Result<T, ApiError> {
        form.validate()?;
        let request = ApiRequest::post(&self.base_path).with_json(form)?;
        self.client.json(&request).await
    }

    /// Validate, then `PUT` the whole entity.
    ///
    /// # Errors
    ///
    /// As [`ResourceClient::create`].
    pub async fn update<F: Serialize + Validate>(&self, id: &EntityId, form: &F) -> Result<T, ApiError> {
        form.validate()?;
        let request = ApiRequest::put(self.item_path(id)).with_json(form)?;
        self.client.json(&request).await
    }

    /// # Errors
    ///
    /// Propagates request errors.
    pub async fn delete(&self, id: &EntityId) -> Result<(), ApiError> {
        self.client.empty(&ApiRequest::delete(self.item_path(id))).await
    }
}

#[cfg(test)]
#[path = "resources_test.rs"]
mod tests;
