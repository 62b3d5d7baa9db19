//! Scripted in-memory collaborators shared by unit tests.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use tokio::sync::{Barrier, Notify};

use crate::error::ApiError;
use crate::net::{ApiRequest, ApiResponse, SessionRenewal, Transport};

/// One scripted reply.
pub enum Reply {
    Respond(ApiResponse),
    Fail(ApiError),
    /// Wait at the barrier, then respond.
    AfterBarrier(Arc<Barrier>, ApiResponse),
    /// Wait until notified, then respond.
    AfterNotify(Arc<Notify>, ApiResponse),
}

impl Reply {
    pub fn status(status: u16) -> Self {
        Self::Respond(ApiResponse::empty(status))
    }

    pub fn json(status: u16, value: serde_json::Value) -> Self {
        Self::Respond(ApiResponse::json_body(status, &value))
    }
}

/// Transport answering from per-route queues keyed by `METHOD path`.
/// Unscripted calls get a 599.
#[derive(Default)]
pub struct ScriptedTransport {
    routes: Mutex<HashMap<String, VecDeque<Reply>>>,
    calls: Mutex<Vec<ApiRequest>>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, route: &str, reply: Reply) -> &Self {
        self.routes
            .lock()
            .unwrap()
            .entry(route.to_owned())
            .or_default()
            .push_back(reply);
        self
    }

    pub fn calls(&self) -> Vec<ApiRequest> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count(&self, route: &str) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.label() == route)
            .count()
    }
}

#[async_trait::async_trait]
impl Transport for ScriptedTransport {
    async fn send(&self, request: &ApiRequest) -> Result<ApiResponse, ApiError> {
        self.calls.lock().unwrap().push(request.clone());
        let reply = self
            .routes
            .lock()
            .unwrap()
            .get_mut(&request.label())
            .and_then(VecDeque::pop_front);
        match reply {
            Some(Reply::Respond(resp)) => Ok(resp),
            Some(Reply::Fail(err)) => Err(err),
            Some(Reply::AfterBarrier(barrier, resp)) => {
                barrier.wait().await;
                Ok(resp)
            }
            Some(Reply::AfterNotify(notify, resp)) => {
                notify.notified().await;
                Ok(resp)
            }
            None => Ok(ApiResponse::new(599, "unscripted")),
        }
    }
}

/// Renewal hook with a fixed outcome and optional delay.
pub struct MockRenewal {
    outcome: bool,
    delay: Duration,
    pub renew_calls: AtomicUsize,
    pub expire_calls: AtomicUsize,
}

impl MockRenewal {
    pub fn new(outcome: bool, delay: Duration) -> Self {
        Self { outcome, delay, renew_calls: AtomicUsize::new(0), expire_calls: AtomicUsize::new(0) }
    }

    pub fn renewals(&self) -> usize {
        self.renew_calls.load(Ordering::SeqCst)
    }

    pub fn expirations(&self) -> usize {
        self.expire_calls.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl SessionRenewal for MockRenewal {
    async fn renew(&self) -> bool {
        self.renew_calls.fetch_add(1, Ordering::SeqCst);
        tokio::time::sleep(self.delay).await;
        self.outcome
    }

    async fn expire(&self) {
        self.expire_calls.fetch_add(1, Ordering::SeqCst);
    }
}
