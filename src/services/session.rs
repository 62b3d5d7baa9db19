//! Process-wide session state.
//!
//! SYSTEM CONTEXT
//! ==============
//! `SessionStore` is the single writer of "who is logged in". Its only
//! mutators are `initialize`, `login`, and `logout` (the retry layer reaches
//! `logout` through `SessionRenewal::expire`). Readers take a `SessionView`,
//! a read-only `watch` receiver, so route guards and UI observers can react
//! to changes without any write access.
//!
//! INVARIANTS
//! ==========
//! - A principal is only ever present while `is_authenticated` is true.
//! - `is_authenticated` without a principal is the transient "principal
//!   pending" state during login; observers treat it as loading.
//! - Startup flips `is_loading` to false exactly once, as its last step,
//!   whether the probe succeeded, failed, or was cancelled.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::watch;

use super::auth::{AuthService, LoginReceipt};
use super::principal::{Principal, Role};
use crate::error::ApiError;
use crate::net::SessionRenewal;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionState {
    pub principal: Option<Principal>,
    pub is_authenticated: bool,
    pub is_loading: bool,
}

impl SessionState {
    /// Unauthenticated, loading: the state at process start.
    #[must_use]
    pub fn starting() -> Self {
        Self { principal: None, is_authenticated: false, is_loading: true }
    }

    #[must_use]
    pub fn signed_out() -> Self {
        Self { principal: None, is_authenticated: false, is_loading: false }
    }

    #[must_use]
    pub fn signed_in(principal: Principal) -> Self {
        Self { principal: Some(principal), is_authenticated: true, is_loading: false }
    }

    #[must_use]
    pub fn role(&self) -> Option<Role> {
        self.principal.as_ref().map(|p| p.role)
    }

    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.role() == Some(Role::Admin)
    }

    /// Authenticated but the principal fetch has not landed yet.
    #[must_use]
    pub fn is_principal_pending(&self) -> bool {
        self.is_authenticated && self.principal.is_none()
    }
}

impl Default for SessionState {
    fn default() -> Self {
        Self::starting()
    }
}

/// Read-only handle on the session.
#[derive(Clone)]
pub struct SessionView {
    rx: watch::Receiver<SessionState>,
}

impl SessionView {
    #[must_use]
    pub fn snapshot(&self) -> SessionState {
        self.rx.borrow().clone()
    }

    /// Wait for the next change and return the new state.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Unauthenticated` if the store has been dropped.
    pub async fn changed(&mut self) -> Result<SessionState, ApiError> {
        self.rx.changed().await.map_err(|_| ApiError::Unauthenticated)?;
        Ok(self.rx.borrow_and_update().clone())
    }
}

/// Flips `is_loading` off if the startup probe is abandoned midway.
struct LoadingGuard<'a> {
    state: &'a watch::Sender<SessionState>,
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        self.state.send_if_modified(|s| {
            let was_loading = s.is_loading;
            s.is_loading = false;
            was_loading
        });
    }
}

pub struct SessionStore {
    auth: Arc<AuthService>,
    state: watch::Sender<SessionState>,
    initialized: AtomicBool,
}

impl SessionStore {
    #[must_use]
    pub fn new(auth: Arc<AuthService>) -> Self {
        let (state, _) = watch::channel(SessionState::starting());
        Self { auth, state, initialized: AtomicBool::new(false) }
    }

    #[must_use]
    pub fn snapshot(&self) -> SessionState {
        self.state.borrow().clone()
    }

    #[must_use]
    pub fn view(&self) -> SessionView {
        SessionView { rx: self.state.subscribe() }
    }

    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.state.borrow().is_admin()
    }

    /// Discover an existing session. Runs once; later calls return the
    /// current state without touching the network.
    ///
    /// Probes `GET /auth/me`; on 401 tries one refresh and probes again. Any
    /// failure simply leaves the session signed out.
    pub async fn initialize(&self) -> SessionState {
        if self.initialized.swap(true, Ordering::SeqCst) {
            return self.snapshot();
        }

        self.state.send_replace(SessionState::starting());
        let _guard = LoadingGuard { state: &self.state };

        let principal = match self.auth.current_principal().await {
            Ok(principal) => Some(principal),
            Err(ApiError::Unauthenticated) => {
                if self.auth.refresh_session().await {
                    self.auth.current_principal().await.ok()
                } else {
                    None
                }
            }
            Err(e) => {
                tracing::debug!(error = %e, "startup session probe failed");
                None
            }
        };

        let next = match principal {
            Some(principal) => {
                tracing::info!(username = %principal.username, role = %principal.role, "session restored");
                SessionState::signed_in(principal)
            }
            None => SessionState::signed_out(),
        };
        self.state.send_replace(next.clone());
        next
    }

    /// Log in, then resolve the principal so the store never settles in an
    /// "authenticated, identity unknown" state.
    ///
    /// # Errors
    ///
    /// Returns the login error (state left signed out, form input untouched)
    /// or the principal fetch error (state cleared).
    pub async fn login(&self, username: &str, password: &str) -> Result<Principal, ApiError> {
        self.state.send_modify(|s| s.is_loading = true);

        let receipt: LoginReceipt = match self.auth.login(username, password).await {
            Ok(receipt) => receipt,
            Err(e) => {
                self.state.send_modify(|s| s.is_loading = false);
                return Err(e);
            }
        };
        if receipt.token.is_some() {
            tracing::debug!("login body carried a token; session cookie is authoritative");
        }

        // Principal pending.
        self.state.send_replace(SessionState { principal: None, is_authenticated: true, is_loading: true });

        match self.auth.current_principal().await {
            Ok(principal) => {
                self.state.send_replace(SessionState::signed_in(principal.clone()));
                Ok(principal)
            }
            Err(e) => {
                tracing::warn!(error = %e, "principal fetch after login failed");
                self.state.send_replace(SessionState::signed_out());
                Err(e)
            }
        }
    }

    /// Ask the backend who the current session belongs to. Leaves the stored
    /// state untouched.
    ///
    /// # Errors
    ///
    /// `ApiError::Unauthenticated` without a valid session, or the decode or
    /// transport error.
    pub async fn current_principal(&self) -> Result<Principal, ApiError> {
        self.auth.current_principal().await
    }

    /// Tell the backend, then clear local state no matter what it said.
    pub async fn logout(&self) {
        if let Err(e) = self.auth.logout().await {
            tracing::warn!(error = %e, "logout request failed; clearing local session anyway");
        }
        self.state.send_replace(SessionState::signed_out());
        tracing::info!("session cleared");
    }
}

#[async_trait::async_trait]
impl SessionRenewal for SessionStore {
    async fn renew(&self) -> bool {
        self.auth.refresh_session().await
    }

    async fn expire(&self) {
        self.logout().await;
    }
}

#[cfg(test)]
#[path = "session_test.rs"]
mod tests;
