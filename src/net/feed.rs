//! Order push feed over WebSocket.
//!
//! SYSTEM CONTEXT
//! ==============
//! The backend pushes loosely-shaped notifications; the console only cares
//! whether a message concerns an order, in which case dashboards refetch.
//! There is no message schema beyond that.
//!
//! The feed task reconnects forever with exponential backoff and publishes
//! `FeedEvent`s on a broadcast channel. Dropping the `OrderFeed` stops it.

use std::time::Duration;

use futures::StreamExt;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;

use crate::error::ApiError;

const EVENT_CAPACITY: usize = 64;
const INITIAL_BACKOFF: Duration = Duration::from_secs(1);
const MAX_BACKOFF: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedEvent {
    Connected,
    Disconnected,
    /// Order data changed server-side; refetch.
    OrdersChanged,
}

/// A decoded push message.
#[derive(Debug, Clone, PartialEq)]
pub enum FeedPayload {
    Json(serde_json::Value),
    Text(String),
}

impl FeedPayload {
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        serde_json::from_str(raw).map_or_else(|_| Self::Text(raw.to_owned()), Self::Json)
    }

    /// Whether this message is about an order.
    #[must_use]
    pub fn concerns_order(&self) -> bool {
        match self {
            Self::Text(text) => mentions_order(text),
            Self::Json(serde_json::Value::Object(map)) => {
                ["type", "event", "topic"].iter().any(|key| {
                    map.get(*key)
                        .and_then(serde_json::Value::as_str)
                        .is_some_and(mentions_order)
                }) || map.contains_key("orderId")
                    || map.contains_key("order")
            }
            Self::Json(serde_json::Value::String(text)) => mentions_order(text),
            Self::Json(_) => false,
        }
    }
}

fn mentions_order(text: &str) -> bool {
    text.to_ascii_lowercase().contains("order")
}

/// Doubling reconnect delay with a ceiling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Backoff {
    initial: Duration,
    max: Duration,
    current: Duration,
}

impl Backoff {
    #[must_use]
    pub fn new(initial: Duration, max: Duration) -> Self {
        Self { initial, max, current: initial }
    }

    /// Delay to wait now; doubles the next one.
    pub fn next_delay(&mut self) -> Duration {
        let delay = self.current;
        self.current = (self.current * 2).min(self.max);
        delay
    }

    pub fn reset(&mut self) {
        self.current = self.initial;
    }
}

impl Default for Backoff {
    fn default() -> Self {
        Self::new(INITIAL_BACKOFF, MAX_BACKOFF)
    }
}

pub struct OrderFeed {
    events: broadcast::Sender<FeedEvent>,
    task: JoinHandle<()>,
}

impl OrderFeed {
    /// Spawn the feed loop on the current tokio runtime.
    #[must_use]
    pub fn spawn(url: impl Into<String>) -> Self {
        Self::spawn_with_backoff(url, Backoff::default())
    }

    #[must_use]
    pub fn spawn_with_backoff(url: impl Into<String>, backoff: Backoff) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        let task = tokio::spawn(feed_loop(url.into(), events.clone(), backoff));
        Self { events, task }
    }

    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<FeedEvent> {
        self.events.subscribe()
    }

    /// Stop the feed task.
    pub fn shutdown(self) {
        drop(self);
    }
}

impl Drop for OrderFeed {
    fn drop(&mut self) {
        self.task.abort();
    }
}

async fn feed_loop(url: String, events: broadcast::Sender<FeedEvent>, mut backoff: Backoff) {
    loop {
        match connect_and_run(&url, &events, &mut backoff).await {
            Ok(()) => tracing::info!(%url, "order feed closed"),
            Err(e) => tracing::warn!(%url, error = %e, "order feed error"),
        }
        let _ = events.send(FeedEvent::Disconnected);

        let delay = backoff.next_delay();
        tracing::debug!(delay_ms = delay.as_millis(), "order feed reconnecting");
        tokio::time::sleep(delay).await;
    }
}

async fn connect_and_run(
    url: &str,
    events: &broadcast::Sender<FeedEvent>,
    backoff: &mut Backoff,
) -> Result<(), ApiError> {
    let (mut stream, _) = connect_async(url)
        .await
        .map_err(|e| ApiError::Transport(e.to_string()))?;
    tracing::info!(%url, "order feed connected");
    backoff.reset();
    let _ = events.send(FeedEvent::Connected);

    while let Some(message) = stream.next().await {
        let payload = match message.map_err(|e| ApiError::Transport(e.to_string()))? {
            Message::Text(text) => FeedPayload::parse(text.as_str()),
            Message::Binary(bytes) => FeedPayload::parse(&String::from_utf8_lossy(&bytes)),
            Message::Close(_) => return Ok(()),
            _ => continue,
        };
        if payload.concerns_order() {
            // No subscribers is fine; the feed keeps running.
            let _ = events.send(FeedEvent::OrdersChanged);
        } else {
            tracing::trace!(?payload, "ignoring non-order message");
        }
    }
    Ok(())
}

#[cfg(test)]
#[path = "feed_test.rs"]
mod tests;
