use std::sync::Arc;

use serde_json::json;

use super::*;
use crate::services::SessionState;
use crate::test_helpers::{Reply, ScriptedTransport};

fn console() -> (Arc<ScriptedTransport>, Console) {
    let transport = Arc::new(ScriptedTransport::new());
    let config = ConsoleConfig::for_base_url("http://localhost:8080/api").unwrap();
    let inner: Arc<dyn Transport> = transport.clone();
    (transport, Console::with_transport(config, inner))
}

#[tokio::test]
async fn expired_session_is_renewed_through_the_store() {
    let (transport, console) = console();
    transport
        .push("GET /admin/tables/7", Reply::status(401))
        .push("POST /auth/refresh-token", Reply::status(200))
        .push("GET /admin/tables/7", Reply::json(200, json!({ "id": 7, "name": "Table 7" })));

    let table = console.tables().get(&7_i64.into()).await.unwrap();

    assert_eq!(table.name, "Table 7");
    assert_eq!(console.renewal_epoch(), 1);
}

#[tokio::test]
async fn failed_renewal_signs_the_session_out() {
    let (transport, console) = console();
    transport
        .push("POST /auth/login", Reply::status(200))
        .push("GET /auth/me", Reply::json(200, json!({ "username": "alice", "role": "ADMIN" })))
        .push("GET /promotions", Reply::status(401))
        .push("POST /auth/refresh-token", Reply::status(401))
        .push("POST /auth/logout", Reply::status(204));
    console.session().login("alice", "secret").await.unwrap();

    let err = console.promotions().list().await.unwrap_err();

    assert_eq!(err, ApiError::Unauthenticated);
    assert_eq!(console.session().snapshot(), SessionState::signed_out());
    assert_eq!(transport.count("GET /promotions"), 1);
}

#[tokio::test]
async fn wrappers_share_the_retrying_client() {
    let (transport, console) = console();
    transport
        .push("GET /shifts/all", Reply::status(401))
        .push("POST /auth/refresh-token", Reply::status(200))
        .push("GET /shifts/all", Reply::json(200, json!([])));

    assert!(console.shifts().list().await.unwrap().is_empty());
    assert_eq!(console.files().file_url("a.png"), "http://localhost:8080/api/files/a.png");
    assert_eq!(console.config().ws_url, "ws://localhost:8080/ws");
}
