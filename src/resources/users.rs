//! Staff accounts.
//!
//! New accounts are created through the public signup endpoint; everything
//! else goes through the admin collection.

use super::models::{User, UserForm};
use super::{EntityId, ResourceClient, Validate};
use crate::error::ApiError;
use crate::net::{ApiClient, ApiRequest};

pub const USERS_PATH: &str = "/admin/users";
pub const SIGNUP_PATH: &str = "/auth/signup";

#[derive(Clone)]
pub struct UsersApi {
    client: ApiClient,
    users: ResourceClient<User>,
}

impl UsersApi {
    #[must_use]
    pub fn new(client: ApiClient) -> Self {
        Self { users: ResourceClient::new(client.clone(), USERS_PATH), client }
    }

    /// # Errors
    ///
    /// Propagates request and decode errors.
    pub async fn list(&self) -> Result<Vec<User>, ApiError> {
        self.users.list().await
    }

    /// # Errors
    ///
    /// Propagates request and decode errors.
    pub async fn get(&self, id: &EntityId) -> Result<User, ApiError> {
        self.users.get(id).await
    }

    /// Create an account via signup. A password is mandatory here.
    ///
    /// # Errors
    ///
    /// `ApiError::Validation` without a request if the form is incomplete.
    pub async fn create(&self, form: &UserForm) -> Result<User, ApiError> {
        form.validate()?;
        if form.password.as_deref().is_none_or(str::is_empty) {
            return Err(ApiError::validation("password", "is required"));
        }
        let request = ApiRequest::post(SIGNUP_PATH).with_json(form)?;
        self.client.json(&request).await
    }

    /// Update profile and role. Any password on the form is not sent.
    ///
    /// # Errors
    ///
    /// `ApiError::Validation` without a request if the form is invalid.
    pub async fn update(&self, id: &EntityId, form: &UserForm) -> Result<User, ApiError> {
        let form = UserForm { password: None, ..form.clone() };
        self.users.update(id, &form).await
    }

    /// # Errors
    ///
    /// Propagates request errors.
    pub async fn delete(&self, id: &EntityId) -> Result<(), ApiError> {
        self.users.delete(id).await
    }
}
