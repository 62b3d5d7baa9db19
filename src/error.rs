//! Client error taxonomy.
//!
//! DESIGN
//! ======
//! One error enum for every layer of the client. HTTP statuses are folded into
//! the taxonomy at a single point (`ApiError::from_status`) so callers match on
//! meaning (`Unauthenticated`, `Validation`, ...) rather than raw codes.
//! Only `Unauthenticated` is ever acted on by the retry layer; everything else
//! propagates to the caller untouched.

use serde::Deserialize;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ApiError {
    /// The backend rejected the submitted credentials.
    #[error("authentication failed: {0}")]
    Authentication(String),

    /// No session, or the session expired and could not be renewed.
    #[error("session expired or missing")]
    Unauthenticated,

    /// Authenticated, but the principal lacks the required role.
    #[error("not authorized: {0}")]
    Authorization(String),

    /// The network call itself could not complete.
    #[error("transport error: {0}")]
    Transport(String),

    /// A submitted form failed validation, locally or server-side.
    #[error("invalid {field}: {message}")]
    Validation { field: String, message: String },

    /// Any other non-success response.
    #[error("unexpected response status {status}")]
    Status { status: u16, body: String },

    /// A response body did not match the expected shape.
    #[error("response decode failed: {0}")]
    Decode(String),

    /// A request payload could not be serialized.
    #[error("request encode failed: {0}")]
    Encode(String),

    /// Configuration could not be parsed.
    #[error("config parse failed: {0}")]
    Config(String),
}

/// Optional structured error body some backend endpoints return.
#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    field: Option<String>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

impl ErrorBody {
    fn parse(body: &str) -> Self {
        serde_json::from_str(body).unwrap_or_default()
    }

    fn message_or(self, fallback: &str) -> String {
        self.message
            .or(self.error)
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| fallback.trim().to_owned())
    }
}

/// Grepable error code and retryable flag.
pub trait ErrorCode: std::fmt::Display {
    fn error_code(&self) -> &'static str;

    fn retryable(&self) -> bool {
        false
    }
}

impl ApiError {
    /// Classify a non-success HTTP response.
    #[must_use]
    pub fn from_status(status: u16, body: &str) -> Self {
        match status {
            401 => Self::Unauthenticated,
            403 => Self::Authorization(ErrorBody::parse(body).message_or("forbidden")),
            400 | 422 => {
                let parsed = ErrorBody::parse(body);
                let field = parsed.field.clone().unwrap_or_else(|| "request".to_owned());
                let message = parsed.message_or(if body.trim().is_empty() { "rejected by server" } else { body });
                Self::Validation { field, message }
            }
            _ => Self::Status { status, body: body.to_owned() },
        }
    }

    /// Shorthand for a locally detected form error.
    #[must_use]
    pub fn validation(field: &str, message: &str) -> Self {
        Self::Validation { field: field.to_owned(), message: message.to_owned() }
    }
}

impl ErrorCode for ApiError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Authentication(_) => "E_AUTHENTICATION",
            Self::Unauthenticated => "E_UNAUTHENTICATED",
            Self::Authorization(_) => "E_AUTHORIZATION",
            Self::Transport(_) => "E_TRANSPORT",
            Self::Validation { .. } => "E_VALIDATION",
            Self::Status { .. } => "E_STATUS",
            Self::Decode(_) => "E_DECODE",
            Self::Encode(_) => "E_ENCODE",
            Self::Config(_) => "E_CONFIG",
        }
    }

    /// Whether repeating the same call unchanged may succeed.
    fn retryable(&self) -> bool {
        matches!(self, Self::Transport(_) | Self::Status { status: 429 | 500..=599, .. })
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        Self::Transport(err.to_string())
    }
}

#[cfg(test)]
#[path = "error_test.rs"]
mod tests;
