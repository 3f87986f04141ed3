//! End-to-end tests over a real WebSocket: a client speaks the wire protocol
//! against a served router, exactly as a browser would.

use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use serde_json::{json, Value};
use tokio::net::{TcpListener, TcpStream};
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use uuid::Uuid;

use collab_service::routes;
use collab_service::state::AppState;
use collab_service::websocket::CollabHub;

type WsClient = WebSocketStream<MaybeTlsStream<TcpStream>>;

async fn spawn_server() -> String {
    let state = AppState {
        hub: CollabHub::new(),
    };
    let app = routes::router(state);
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("serve");
    });
    format!("127.0.0.1:{}", addr.port())
}

async fn ws_connect(addr: &str) -> WsClient {
    let (ws, _) = connect_async(format!("ws://{addr}/ws"))
        .await
        .expect("ws connect");
    ws
}

async fn send_json(ws: &mut WsClient, value: Value) {
    ws.send(Message::Text(value.to_string()))
        .await
        .expect("ws send");
}

async fn recv_json(ws: &mut WsClient) -> Value {
    loop {
        let frame = tokio::time::timeout(Duration::from_secs(5), ws.next())
            .await
            .expect("timed out waiting for frame")
            .expect("stream ended")
            .expect("ws read");
        if let Message::Text(text) = frame {
            return serde_json::from_str(&text).expect("json frame");
        }
    }
}

async fn authenticate_as(ws: &mut WsClient, user_id: Uuid, name: &str) {
    send_json(
        ws,
        json!({
            "type": "authenticate",
            "user_id": user_id,
            "display_name": name,
            "role": "editor",
        }),
    )
    .await;
    let reply = recv_json(ws).await;
    assert_eq!(reply["type"], "authenticated");
    assert_eq!(reply["user"]["user_id"], user_id.to_string());
}

#[tokio::test]
async fn test_full_chat_flow_over_websocket() {
    let addr = spawn_server().await;

    let mut ana = ws_connect(&addr).await;
    let ana_id = Uuid::new_v4();
    authenticate_as(&mut ana, ana_id, "Ana").await;
    send_json(
        &mut ana,
        json!({"type": "join_room", "room_id": "camp-1", "kind": "campaign"}),
    )
    .await;
    let joined = recv_json(&mut ana).await;
    assert_eq!(joined["type"], "room_joined");
    assert_eq!(joined["room"]["room_id"], "camp-1");

    let mut ben = ws_connect(&addr).await;
    authenticate_as(&mut ben, Uuid::new_v4(), "Ben").await;
    let connected = recv_json(&mut ana).await;
    assert_eq!(connected["type"], "user_connected");

    send_json(
        &mut ben,
        json!({"type": "join_room", "room_id": "camp-1", "kind": "campaign"}),
    )
    .await;
    let ben_joined = recv_json(&mut ben).await;
    assert_eq!(ben_joined["type"], "room_joined");
    assert_eq!(ben_joined["room"]["members"].as_array().unwrap().len(), 2);
    let seen_join = recv_json(&mut ana).await;
    assert_eq!(seen_join["type"], "user_joined_room");
    assert_eq!(seen_join["user"]["display_name"], "Ben");

    send_json(
        &mut ana,
        json!({
            "type": "send_message",
            "room_id": "camp-1",
            "kind": "chat",
            "content": {"content": "hi"},
        }),
    )
    .await;
    let ana_copy = recv_json(&mut ana).await;
    assert_eq!(ana_copy["type"], "new_message");
    let ben_copy = recv_json(&mut ben).await;
    assert_eq!(ben_copy["type"], "new_message");
    assert_eq!(ben_copy["message"]["sender_id"], ana_id.to_string());
    assert_eq!(ben_copy["message"]["payload"]["content"], "hi");
}

#[tokio::test]
async fn test_reauthentication_evicts_previous_connection() {
    let addr = spawn_server().await;
    let user_id = Uuid::new_v4();

    let mut first = ws_connect(&addr).await;
    authenticate_as(&mut first, user_id, "Ana").await;

    let mut second = ws_connect(&addr).await;
    authenticate_as(&mut second, user_id, "Ana").await;

    let evicted = recv_json(&mut first).await;
    assert_eq!(evicted["type"], "session_evicted");
    assert_eq!(evicted["reason"], "superseded");
}

#[tokio::test]
async fn test_unknown_event_is_rejected() {
    let addr = spawn_server().await;
    let mut ws = ws_connect(&addr).await;
    authenticate_as(&mut ws, Uuid::new_v4(), "Ana").await;

    send_json(&mut ws, json!({"type": "shapeshift"})).await;

    let reply = recv_json(&mut ws).await;
    assert_eq!(reply["type"], "error");
    assert_eq!(reply["code"], "invalid_event");
}

#[tokio::test]
async fn test_room_actions_require_authentication_first() {
    let addr = spawn_server().await;
    let mut ws = ws_connect(&addr).await;

    send_json(
        &mut ws,
        json!({"type": "join_room", "room_id": "camp-1", "kind": "campaign"}),
    )
    .await;

    let reply = recv_json(&mut ws).await;
    assert_eq!(reply["type"], "error");
    assert_eq!(reply["code"], "unauthenticated");
}

#[tokio::test]
async fn test_heartbeat_is_acknowledged() {
    let addr = spawn_server().await;
    let mut ws = ws_connect(&addr).await;
    authenticate_as(&mut ws, Uuid::new_v4(), "Ana").await;

    send_json(&mut ws, json!({"type": "heartbeat"})).await;

    let reply = recv_json(&mut ws).await;
    assert_eq!(reply["type"], "heartbeat_ack");
}

#[tokio::test]
async fn test_health_and_metrics_endpoints() {
    let addr = spawn_server().await;
    // touch the hub so the session gauge exists in the registry
    let mut ws = ws_connect(&addr).await;
    authenticate_as(&mut ws, Uuid::new_v4(), "Ana").await;

    let health: Value = reqwest::get(format!("http://{addr}/health"))
        .await
        .expect("health request")
        .json()
        .await
        .expect("health body");
    assert_eq!(health["status"], "ok");

    let metrics = reqwest::get(format!("http://{addr}/metrics"))
        .await
        .expect("metrics request");
    assert!(metrics.status().is_success());
    let body = metrics.text().await.expect("metrics body");
    assert!(body.contains("collab_active_sessions"));
}
