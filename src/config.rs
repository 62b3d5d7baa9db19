//! Client configuration parsed from environment variables.

use crate::error::ApiError;

pub const DEFAULT_API_BASE_URL: &str = "http://localhost:8080/api";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_RENEWAL_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConsoleTimeouts {
    pub request_secs: u64,
    pub connect_secs: u64,
    /// Upper bound on a single session renewal call.
    pub renewal_secs: u64,
}

impl Default for ConsoleTimeouts {
    fn default() -> Self {
        Self {
            request_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            connect_secs: DEFAULT_CONNECT_TIMEOUT_SECS,
            renewal_secs: DEFAULT_RENEWAL_TIMEOUT_SECS,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConsoleConfig {
    /// REST base, e.g. `http://localhost:8080/api`. Never ends with `/`.
    pub api_base_url: String,
    /// Order feed WebSocket URL.
    pub ws_url: String,
    pub timeouts: ConsoleTimeouts,
}

impl ConsoleConfig {
    /// Build typed config from environment variables.
    ///
    /// Optional:
    /// - `TABLESIDE_API_BASE_URL`: default `http://localhost:8080/api`
    /// - `TABLESIDE_WS_URL`: derived from the base URL origin when absent
    /// - `TABLESIDE_REQUEST_TIMEOUT_SECS`: default 30
    /// - `TABLESIDE_CONNECT_TIMEOUT_SECS`: default 10
    /// - `TABLESIDE_RENEWAL_TIMEOUT_SECS`: default 10
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Config` if a URL is not http(s)/ws(s).
    pub fn from_env() -> Result<Self, ApiError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build config from an arbitrary key lookup.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Config` if a URL is not http(s)/ws(s).
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ApiError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_base_url = lookup("TABLESIDE_API_BASE_URL")
            .unwrap_or_else(|| DEFAULT_API_BASE_URL.to_owned())
            .trim()
            .trim_end_matches('/')
            .to_owned();
        validate_base_url(&api_base_url)?;
        let ws_url = match lookup("TABLESIDE_WS_URL") {
            Some(url) => validate_ws_url(url.trim())?,
            None => derive_ws_url(&api_base_url)?,
        };
        let parse = |key: &str, default: u64| {
            lookup(key)
                .and_then(|v| v.trim().parse::<u64>().ok())
                .filter(|v| *v > 0)
                .unwrap_or(default)
        };
        let timeouts = ConsoleTimeouts {
            request_secs: parse("TABLESIDE_REQUEST_TIMEOUT_SECS", DEFAULT_REQUEST_TIMEOUT_SECS),
            connect_secs: parse("TABLESIDE_CONNECT_TIMEOUT_SECS", DEFAULT_CONNECT_TIMEOUT_SECS),
            renewal_secs: parse("TABLESIDE_RENEWAL_TIMEOUT_SECS", DEFAULT_RENEWAL_TIMEOUT_SECS),
        };

        Ok(Self { api_base_url, ws_url, timeouts })
    }

    /// Config pointing at an explicit backend, with default timeouts.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Config` if the base URL is not http(s).
    pub fn for_base_url(api_base_url: &str) -> Result<Self, ApiError> {
        let api_base_url = api_base_url.trim().trim_end_matches('/').to_owned();
        validate_base_url(&api_base_url)?;
        let ws_url = derive_ws_url(&api_base_url)?;
        Ok(Self { api_base_url, ws_url, timeouts: ConsoleTimeouts::default() })
    }
}

/// `http://host:port/api` -> `ws://host:port/ws`.
pub(crate) fn derive_ws_url(api_base_url: &str) -> Result<String, ApiError> {
    let (scheme, rest) = if let Some(rest) = api_base_url.strip_prefix("http://") {
        ("ws", rest)
    } else if let Some(rest) = api_base_url.strip_prefix("https://") {
        ("wss", rest)
    } else {
        return Err(ApiError::Config(format!("invalid base URL: {api_base_url}")));
    };
    let authority = rest.split('/').next().unwrap_or_default();
    if authority.is_empty() {
        return Err(ApiError::Config(format!("invalid base URL: {api_base_url}")));
    }
    Ok(format!("{scheme}://{authority}/ws"))
}

fn validate_base_url(url: &str) -> Result<(), ApiError> {
    if url.starts_with("http://") || url.starts_with("https://") {
        Ok(())
    } else {
        Err(ApiError::Config(format!("invalid base URL: {url}")))
    }
}

fn validate_ws_url(url: &str) -> Result<String, ApiError> {
    if url.starts_with("ws://") || url.starts_with("wss://") {
        Ok(url.to_owned())
    } else {
        Err(ApiError::Config(format!("invalid websocket URL: {url}")))
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
