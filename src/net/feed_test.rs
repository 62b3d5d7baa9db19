use super::*;
use serde_json::json;

// =============================================================================
// FeedPayload
// =============================================================================

#[test]
fn parse_json_payload() {
    assert_eq!(FeedPayload::parse(r#"{"type":"ORDER_CREATED"}"#), FeedPayload::Json(json!({ "type": "ORDER_CREATED" })));
}

#[test]
fn parse_falls_back_to_text() {
    assert_eq!(FeedPayload::parse("new order #12"), FeedPayload::Text("new order #12".into()));
}

#[test]
fn order_type_field_concerns_order() {
    assert!(FeedPayload::parse(r#"{"type":"ORDER_UPDATED","id":3}"#).concerns_order());
    assert!(FeedPayload::parse(r#"{"event":"order:paid"}"#).concerns_order());
    assert!(FeedPayload::parse(r#"{"topic":"/topic/orders"}"#).concerns_order());
}

#[test]
fn order_keys_concern_order() {
    assert!(FeedPayload::parse(r#"{"orderId":"abc"}"#).concerns_order());
    assert!(FeedPayload::parse(r#"{"order":{"id":1}}"#).concerns_order());
}

#[test]
fn unrelated_json_is_ignored() {
    assert!(!FeedPayload::parse(r#"{"type":"TABLE_CLEANED"}"#).concerns_order());
    assert!(!FeedPayload::parse("[1,2,3]").concerns_order());
    assert!(!FeedPayload::parse("42").concerns_order());
}

#[test]
fn plain_text_matches_case_insensitively() {
    assert!(FeedPayload::parse("NEW ORDER").concerns_order());
    assert!(!FeedPayload::parse("ping").concerns_order());
}

#[test]
fn json_string_payload_is_checked() {
    assert!(FeedPayload::parse(r#""order-created""#).concerns_order());
}

// =============================================================================
// Backoff
// =============================================================================

#[test]
fn backoff_doubles_up_to_cap() {
    let mut backoff = Backoff::new(Duration::from_secs(1), Duration::from_secs(10));
    let delays: Vec<u64> = (0..6).map(|_| backoff.next_delay().as_secs()).collect();
    assert_eq!(delays, vec![1, 2, 4, 8, 10, 10]);
}

#[test]
fn backoff_reset_returns_to_initial() {
    let mut backoff = Backoff::default();
    backoff.next_delay();
    backoff.next_delay();
    backoff.reset();
    assert_eq!(backoff.next_delay(), Duration::from_secs(1));
}

#[tokio::test]
async fn unreachable_feed_reports_disconnects() {
    // Port 9 on loopback is discard; nothing should accept a websocket there.
    let feed = OrderFeed::spawn_with_backoff(
        "ws://127.0.0.1:9/ws",
        Backoff::new(Duration::from_millis(10), Duration::from_millis(20)),
    );
    let mut events = feed.subscribe();

    let event = tokio::time::timeout(Duration::from_secs(5), events.recv())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(event, FeedEvent::Disconnected);
    feed.shutdown();
}
