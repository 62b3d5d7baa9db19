//! Access decisions for protected views.
//!
//! The guard is a pure function of the session snapshot: it never renders,
//! it only says what the caller should do. While the session is loading
//! nothing else in the snapshot is trusted, including a principal left over
//! from before a re-login. "Logged in with the wrong role"
//! and "not logged in" are distinct outcomes and must stay distinct.

use super::principal::Role;
use super::session::{SessionState, SessionView};
use crate::error::ApiError;

pub const LOGIN_PATH: &str = "/login";
pub const UNAUTHORIZED_PATH: &str = "/unauthorized";
pub const DEFAULT_LANDING_PATH: &str = "/dashboard";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardDecision {
    /// Session (or principal) not resolved yet; show a neutral waiting state.
    Wait,
    /// Not logged in. `return_to` is where to go after a successful login.
    RedirectToLogin { return_to: String },
    /// Logged in, wrong role.
    RedirectUnauthorized,
    Render,
}

impl GuardDecision {
    /// Redirect target, if any.
    #[must_use]
    pub fn redirect_path(&self) -> Option<&'static str> {
        match self {
            Self::RedirectToLogin { .. } => Some(LOGIN_PATH),
            Self::RedirectUnauthorized => Some(UNAUTHORIZED_PATH),
            Self::Wait | Self::Render => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RouteGuard {
    required_role: Option<Role>,
}

impl RouteGuard {
    /// Any authenticated principal may pass.
    #[must_use]
    pub fn authenticated() -> Self {
        Self { required_role: None }
    }

    #[must_use]
    pub fn requiring(role: Role) -> Self {
        Self { required_role: Some(role) }
    }

    #[must_use]
    pub fn required_role(&self) -> Option<Role> {
        self.required_role
    }

    #[must_use]
    pub fn evaluate(&self, state: &SessionState, requested_path: &str) -> GuardDecision {
        if state.is_loading {
            return GuardDecision::Wait;
        }
        if !state.is_authenticated {
            return GuardDecision::RedirectToLogin { return_to: requested_path.to_owned() };
        }
        let Some(principal) = &state.principal else {
            return GuardDecision::Wait;
        };
        match self.required_role {
            Some(required) if principal.role != required => GuardDecision::RedirectUnauthorized,
            _ => GuardDecision::Render,
        }
    }

    /// Wait until the session is resolved enough to decide.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Unauthenticated` if the session store goes away
    /// while still waiting.
    pub async fn resolve(&self, view: &mut SessionView, requested_path: &str) -> Result<GuardDecision, ApiError> {
        let mut state = view.snapshot();
        loop {
            let decision = self.evaluate(&state, requested_path);
            if decision != GuardDecision::Wait {
                return Ok(decision);
            }
            state = view.changed().await?;
        }
    }
}

/// Where to send the user after login. Only same-origin absolute paths are
/// honored; anything else lands on the dashboard.
#[must_use]
pub fn post_login_destination(return_to: Option<&str>) -> &str {
    match return_to {
        Some(path) if path.starts_with('/') && !path.starts_with("//") && path != LOGIN_PATH => path,
        _ => DEFAULT_LANDING_PATH,
    }
}

#[cfg(test)]
#[path = "guard_test.rs"]
mod tests;
