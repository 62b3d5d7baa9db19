//! Session-lifecycle calls against the backend.
//!
//! ARCHITECTURE
//! ============
//! `AuthService` is the only component that talks to `/auth/*`. It sends
//! through the raw transport, never through `AuthRetry`, so a rejected
//! refresh cannot recurse into another renewal. It owns no state: the
//! session cookie lives in the transport's cookie store and the resolved
//! principal lives in `SessionStore`.

use std::sync::Arc;

use serde::Serialize;

use super::principal::Principal;
use crate::error::ApiError;
use crate::net::{ApiRequest, Transport};

pub const LOGIN_PATH: &str = "/auth/login";
pub const REFRESH_PATH: &str = "/auth/refresh-token";
pub const LOGOUT_PATH: &str = "/auth/logout";
pub const ME_PATH: &str = "/auth/me";

#[derive(Serialize)]
struct LoginRequest<'a> {
    username: &'a str,
    password: &'a str,
}

/// Result of a successful login.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoginReceipt {
    /// Token echoed in the login body, if the backend sends one. Informational
    /// only: the session rides on the cookie and this is never attached.
    pub token: Option<String>,
}

impl LoginReceipt {
    fn from_body(body: &[u8]) -> Self {
        let token = serde_json::from_slice::<serde_json::Value>(body)
            .ok()
            .and_then(|value| {
                ["token", "accessToken"]
                    .iter()
                    .find_map(|key| value.get(*key).and_then(serde_json::Value::as_str).map(ToOwned::to_owned))
            });
        Self { token }
    }
}

pub struct AuthService {
    transport: Arc<dyn Transport>,
}

impl AuthService {
    #[must_use]
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }

    /// `POST /auth/login`. On success the backend has set the session cookie.
    ///
    /// # Errors
    ///
    /// - `ApiError::Validation` if either credential is empty (no request sent)
    /// - `ApiError::Authentication` if the backend rejects the credentials
    /// - `ApiError::Transport` if the call could not complete
    pub async fn login(&self, username: &str, password: &str) -> Result<LoginReceipt, ApiError> {
        if username.trim().is_empty() {
            return Err(ApiError::validation("username", "must not be empty"));
        }
        if password.is_empty() {
            return Err(ApiError::validation("password", "must not be empty"));
        }

        let request = ApiRequest::post(LOGIN_PATH).with_json(&LoginRequest { username, password })?;
        let response = self.transport.send(&request).await.inspect_err(|e| {
            tracing::warn!(%username, error = %e, "login request failed");
        })?;

        match response.status {
            200..=299 => {
                tracing::info!(%username, "login succeeded");
                Ok(LoginReceipt::from_body(&response.body))
            }
            401 | 403 => {
                tracing::info!(%username, status = response.status, "login rejected");
                Err(ApiError::Authentication("invalid username or password".to_owned()))
            }
            status => Err(ApiError::from_status(status, &response.text())),
        }
    }

    /// `POST /auth/refresh-token`. Never fails: any problem, including having
    /// no session at all, yields `false`.
    pub async fn refresh_session(&self) -> bool {
        match self.transport.send(&ApiRequest::post(REFRESH_PATH)).await {
            Ok(response) if response.is_success() => {
                tracing::debug!("session refresh succeeded");
                true
            }
            Ok(response) => {
                tracing::warn!(status = response.status, "session refresh rejected");
                false
            }
            Err(e) => {
                tracing::warn!(error = %e, "session refresh failed");
                false
            }
        }
    }

    /// `POST /auth/logout`. Best effort; callers clear local state regardless.
    ///
    /// # Errors
    ///
    /// Returns the transport or status error so the caller can log it.
    pub async fn logout(&self) -> Result<(), ApiError> {
        let response = self.transport.send(&ApiRequest::post(LOGOUT_PATH)).await?;
        response.error_for_status().map(|_| ())
    }

    /// `GET /auth/me`.
    ///
    /// # Errors
    ///
    /// - `ApiError::Unauthenticated` if there is no valid session
    /// - `ApiError::Decode` if the body is not a principal with a known role
    pub async fn current_principal(&self) -> Result<Principal, ApiError> {
        let response = self.transport.send(&ApiRequest::get(ME_PATH)).await?;
        response.error_for_status()?.json()
    }
}

#[cfg(test)]
#[path = "auth_test.rs"]
mod tests;
