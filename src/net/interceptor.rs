//! Session-expiry recovery around a `Transport`.
//!
//! ARCHITECTURE
//! ============
//! `AuthRetry` is a decorator: it implements `Transport` by wrapping another
//! one. Each response is classified by `RetryPolicy`; a 401 suspends the call,
//! joins (or starts) the single in-flight renewal, and replays the original
//! request once the renewal settles.
//!
//! Concurrent 401s share one renewal: the first caller installs a `Shared`
//! future in the gate, later callers clone it and await the same outcome. The
//! future clears the gate itself as its final step, so the next expiry starts
//! a fresh renewal.
//!
//! INVARIANTS
//! ==========
//! - At most one replay per logical request. A replay that is rejected again
//!   fails with `Unauthenticated` without another renewal.
//! - Transport errors and non-401 statuses are never retried here.
//! - A failed (or timed out) renewal expires the session exactly once, no
//!   matter how many callers were queued behind it. A 401 for a request sent
//!   before that failure settles fails immediately instead of renewing again.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use futures::FutureExt;
use futures::future::{BoxFuture, Shared};

use super::transport::Transport;
use super::types::{ApiRequest, ApiResponse};
use crate::config::ConsoleConfig;
use crate::error::ApiError;

/// Renewal hooks the retry layer needs from the session owner.
#[async_trait::async_trait]
pub trait SessionRenewal: Send + Sync {
    /// Silently renew the session. `false` on any failure.
    async fn renew(&self) -> bool;

    /// Renewal failed for good; drop the local session.
    async fn expire(&self);
}

/// What to do with a response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    /// Hand the response to the caller as-is.
    Pass,
    /// Renew the session, then replay.
    Renew,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub renewal_timeout: Duration,
}

impl RetryPolicy {
    #[must_use]
    pub fn new(renewal_timeout: Duration) -> Self {
        Self { renewal_timeout }
    }

    #[must_use]
    pub fn from_config(config: &ConsoleConfig) -> Self {
        Self::new(Duration::from_secs(config.timeouts.renewal_secs))
    }

    #[must_use]
    pub fn classify(&self, response: &ApiResponse) -> Disposition {
        if response.status == 401 { Disposition::Renew } else { Disposition::Pass }
    }
}

type RenewalFuture = Shared<BoxFuture<'static, bool>>;

#[derive(Default)]
struct RenewalGate {
    in_flight: Mutex<Option<RenewalFuture>>,
    /// Bumped after every successful renewal.
    epoch: AtomicU64,
    /// Bumped after every settled renewal, successful or not.
    generation: AtomicU64,
    last_renewed: AtomicBool,
}

impl RenewalGate {
    fn epoch(&self) -> u64 {
        self.epoch.load(Ordering::SeqCst)
    }

    fn generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    fn settle(&self, renewed: bool) {
        if renewed {
            self.epoch.fetch_add(1, Ordering::SeqCst);
        }
        self.last_renewed.store(renewed, Ordering::SeqCst);
        self.generation.fetch_add(1, Ordering::SeqCst);
    }

    fn slot(&self) -> std::sync::MutexGuard<'_, Option<RenewalFuture>> {
        self.in_flight.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

pub struct AuthRetry {
    inner: Arc<dyn Transport>,
    session: Arc<dyn SessionRenewal>,
    policy: RetryPolicy,
    gate: Arc<RenewalGate>,
}

impl AuthRetry {
    #[must_use]
    pub fn new(inner: Arc<dyn Transport>, session: Arc<dyn SessionRenewal>, policy: RetryPolicy) -> Self {
        Self { inner, session, policy, gate: Arc::new(RenewalGate::default()) }
    }

    /// Number of successful renewals so far.
    #[must_use]
    pub fn renewal_epoch(&self) -> u64 {
        self.gate.epoch()
    }

    /// Join the in-flight renewal, or start one.
    async fn renew(&self) -> bool {
        let renewal = {
            let mut slot = self.gate.slot();
            if let Some(existing) = slot.as_ref() {
                tracing::debug!("session renewal already in flight; queueing");
                existing.clone()
            } else {
                let fresh = self.start_renewal();
                *slot = Some(fresh.clone());
                fresh
            }
        };
        renewal.await
    }

    fn start_renewal(&self) -> RenewalFuture {
        let session = Arc::clone(&self.session);
        let gate = Arc::clone(&self.gate);
        let timeout = self.policy.renewal_timeout;

        async move {
            tracing::debug!("renewing session");
            let renewed = match tokio::time::timeout(timeout, session.renew()).await {
                Ok(renewed) => renewed,
                Err(_) => {
                    tracing::warn!(timeout_ms = timeout.as_millis(), "session renewal timed out");
                    false
                }
            };

            if renewed {
                tracing::info!("session renewed");
            } else {
                tracing::warn!("session renewal failed; expiring session");
                session.expire().await;
            }

            gate.settle(renewed);
            gate.slot().take();
            renewed
        }
        .boxed()
        .shared()
    }
}

#[async_trait::async_trait]
impl Transport for AuthRetry {
    async fn send(&self, request: &ApiRequest) -> Result<ApiResponse, ApiError> {
        let generation = self.gate.generation();
        let response = self.inner.send(request).await?;
        if self.policy.classify(&response) == Disposition::Pass {
            return Ok(response);
        }

        // A renewal settled after this request went out; reuse its outcome.
        let renewed = if self.gate.generation() == generation {
            self.renew().await
        } else {
            let renewed = self.gate.last_renewed.load(Ordering::SeqCst);
            tracing::debug!(request = %request.label(), renewed, "renewal settled since dispatch");
            renewed
        };
        if !renewed {
            return Err(ApiError::Unauthenticated);
        }

        tracing::debug!(request = %request.label(), attempt = 2, "replaying after renewal");
        let replay = self.inner.send(request).await?;
        if self.policy.classify(&replay) == Disposition::Renew {
            tracing::warn!(request = %request.label(), "replay rejected after renewal");
            return Err(ApiError::Unauthenticated);
        }
        Ok(replay)
    }
}

#[cfg(test)]
#[path = "interceptor_test.rs"]
mod tests;
