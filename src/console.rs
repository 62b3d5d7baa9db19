//! Top-level handle wiring the client together.
//!
//! ```text
//!   HttpTransport (cookie store) ──┬── AuthService ── SessionStore
//!                                  │                      │ SessionRenewal
//!                                  └── AuthRetry ◄────────┘
//!                                        │
//!                                    ApiClient ── resources, reports
//! ```
//!
//! Auth calls use the raw transport; everything else goes through
//! `AuthRetry`, which renews via the session store on a 401.

use std::sync::Arc;

use crate::config::ConsoleConfig;
use crate::error::ApiError;
use crate::net::feed::OrderFeed;
use crate::net::{ApiClient, AuthRetry, HttpTransport, RetryPolicy, SessionRenewal, Transport};
use crate::reports::{DashboardApi, ReportApi};
use crate::resources::models::{DiningTable, Promotion};
use crate::resources::{FilesApi, MenuApi, PROMOTIONS_PATH, ResourceClient, ShiftsApi, TABLES_PATH, UsersApi};
use crate::services::{AuthService, SessionStore};

pub struct Console {
    config: ConsoleConfig,
    session: Arc<SessionStore>,
    retry: Arc<AuthRetry>,
    client: ApiClient,
}

impl Console {
    /// Build the HTTP stack from `config`. No network I/O happens here.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Config` if the HTTP client cannot be built.
    pub fn connect(config: ConsoleConfig) -> Result<Self, ApiError> {
        let transport: Arc<dyn Transport> = Arc::new(HttpTransport::new(&config)?);
        Ok(Self::with_transport(config, transport))
    }

    /// Wire the console over an arbitrary transport.
    #[must_use]
    pub fn with_transport(config: ConsoleConfig, transport: Arc<dyn Transport>) -> Self {
        let auth = Arc::new(AuthService::new(Arc::clone(&transport)));
        let session = Arc::new(SessionStore::new(auth));
        let renewal: Arc<dyn SessionRenewal> = session.clone();
        let retry = Arc::new(AuthRetry::new(transport, renewal, RetryPolicy::from_config(&config)));
        let client = ApiClient::new(retry.clone());
        Self { config, session, retry, client }
    }

    #[must_use]
    pub fn config(&self) -> &ConsoleConfig {
        &self.config
    }

    #[must_use]
    pub fn session(&self) -> &Arc<SessionStore> {
        &self.session
    }

    /// Renewals completed so far by the retry layer.
    #[must_use]
    pub fn renewal_epoch(&self) -> u64 {
        self.retry.renewal_epoch()
    }

    /// Session-aware client for calls not covered by a typed wrapper.
    #[must_use]
    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    #[must_use]
    pub fn menu(&self) -> MenuApi {
        MenuApi::new(self.client.clone())
    }

    #[must_use]
    pub fn tables(&self) -> ResourceClient<DiningTable> {
        ResourceClient::new(self.client.clone(), TABLES_PATH)
    }

    #[must_use]
    pub fn users(&self) -> UsersApi {
        UsersApi::new(self.client.clone())
    }

    #[must_use]
    pub fn promotions(&self) -> ResourceClient<Promotion> {
        ResourceClient::new(self.client.clone(), PROMOTIONS_PATH)
    }

    #[must_use]
    pub fn shifts(&self) -> ShiftsApi {
        ShiftsApi::new(self.client.clone())
    }

    #[must_use]
    pub fn files(&self) -> FilesApi {
        FilesApi::new(self.client.clone(), self.config.api_base_url.clone())
    }

    #[must_use]
    pub fn reports(&self) -> ReportApi {
        ReportApi::new(self.client.clone())
    }

    #[must_use]
    pub fn dashboard(&self) -> DashboardApi {
        DashboardApi::new(self.client.clone())
    }

    /// Start the order feed. Must be called inside a tokio runtime.
    #[must_use]
    pub fn order_feed(&self) -> OrderFeed {
        OrderFeed::spawn(self.config.ws_url.clone())
    }
}

#[cfg(test)]
#[path = "console_test.rs"]
mod tests;
