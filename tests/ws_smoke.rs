//! End-to-end smoke tests: live clients against a spawned relay.
//!
//! Mirrors the manual smoke flow: two clients connect, exchange private
//! messages (with sender echo), then a broadcast reaches everyone.

#![allow(clippy::panic)]

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::time::timeout;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};

use chat_relay::app_state::AppState;
use chat_relay::domain::ConnectionRegistry;

type Client = WebSocketStream<MaybeTlsStream<TcpStream>>;

async fn spawn_relay() -> SocketAddr {
    let registry = Arc::new(ConnectionRegistry::new(64));
    let app = chat_relay::build_app().with_state(AppState { registry });
    let Ok(listener) = tokio::net::TcpListener::bind("127.0.0.1:0").await else {
        panic!("failed to bind test listener");
    };
    let Ok(addr) = listener.local_addr() else {
        panic!("listener has no local addr");
    };
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    addr
}

async fn connect(addr: SocketAddr, username: &str) -> Client {
    let Ok((ws, _)) = connect_async(format!("ws://{addr}/ws/{username}")).await else {
        panic!("failed to connect as {username}");
    };
    ws
}

async fn send_text(ws: &mut Client, text: &str) {
    let Ok(()) = ws.send(Message::text(text)).await else {
        panic!("failed to send frame");
    };
}

async fn recv_text(ws: &mut Client) -> String {
    loop {
        let Ok(frame) = timeout(Duration::from_secs(3), ws.next()).await else {
            panic!("timed out waiting for frame");
        };
        match frame {
            Some(Ok(Message::Text(text))) => return text.as_str().to_string(),
            Some(Ok(_)) => {}
            other => panic!("stream ended unexpectedly: {other:?}"),
        }
    }
}

#[tokio::test]
async fn private_and_broadcast_roundtrip() {
    let addr = spawn_relay().await;
    let mut alice = connect(addr, "alice").await;
    let mut bob = connect(addr, "bob").await;

    // alice -> bob (private), with confirmation echo to alice
    send_text(&mut alice, r#"{"to": "bob", "message": "hello bob"}"#).await;
    assert_eq!(recv_text(&mut bob).await, "(private) alice: hello bob");
    assert_eq!(recv_text(&mut alice).await, "(to bob) You: hello bob");

    // bob -> alice (private)
    send_text(&mut bob, r#"{"to": "alice", "message": "hi alice"}"#).await;
    assert_eq!(recv_text(&mut alice).await, "(private) bob: hi alice");
    assert_eq!(recv_text(&mut bob).await, "(to alice) You: hi alice");

    // alice -> all (broadcast), received by both
    send_text(&mut alice, r#"{"message": "hello everyone"}"#).await;
    assert_eq!(recv_text(&mut bob).await, "alice: hello everyone");
    assert_eq!(recv_text(&mut alice).await, "alice: hello everyone");
}

#[tokio::test]
async fn malformed_json_is_broadcast_verbatim() {
    let addr = spawn_relay().await;
    let mut alice = connect(addr, "alice").await;
    let mut bob = connect(addr, "bob").await;

    // Prove bob is registered before alice broadcasts.
    send_text(&mut bob, r#"{"to": "alice", "message": "ready"}"#).await;
    assert_eq!(recv_text(&mut alice).await, "(private) bob: ready");
    assert_eq!(recv_text(&mut bob).await, "(to alice) You: ready");

    send_text(&mut alice, "plain hello").await;
    assert_eq!(recv_text(&mut bob).await, "alice: plain hello");
}

#[tokio::test]
async fn duplicate_username_replaces_connection() {
    let addr = spawn_relay().await;
    let mut first = connect(addr, "alice").await;
    let mut bob = connect(addr, "bob").await;
    let mut second = connect(addr, "alice").await;

    // The second session works once registered.
    send_text(&mut second, r#"{"to": "bob", "message": "second here"}"#).await;
    assert_eq!(recv_text(&mut bob).await, "(private) alice: second here");
    assert_eq!(recv_text(&mut second).await, "(to bob) You: second here");

    // Deliveries to "alice" reach the replacement, and the replaced
    // connection gets torn down rather than receiving them.
    send_text(&mut bob, r#"{"to": "alice", "message": "hi again"}"#).await;
    assert_eq!(recv_text(&mut second).await, "(private) bob: hi again");
    assert_eq!(recv_text(&mut bob).await, "(to alice) You: hi again");

    let Ok(end) = timeout(Duration::from_secs(3), first.next()).await else {
        panic!("replaced connection was not closed");
    };
    assert!(
        !matches!(end, Some(Ok(Message::Text(_)))),
        "replaced connection must not receive frames"
    );

    // The replaced connection's teardown must not announce a departure
    // for the still-live username.
    send_text(&mut second, r#"{"message": "still here"}"#).await;
    assert_eq!(recv_text(&mut bob).await, "alice: still here");
}

#[tokio::test]
async fn departure_is_broadcast_to_remaining_clients() {
    let addr = spawn_relay().await;
    let mut alice = connect(addr, "alice").await;
    let mut bob = connect(addr, "bob").await;

    // Prove both are registered.
    send_text(&mut alice, r#"{"to": "bob", "message": "ready"}"#).await;
    assert_eq!(recv_text(&mut bob).await, "(private) alice: ready");
    assert_eq!(recv_text(&mut alice).await, "(to bob) You: ready");

    let Ok(()) = alice.close(None).await else {
        panic!("failed to close connection");
    };

    assert_eq!(recv_text(&mut bob).await, "alice left the chat");
}

#[tokio::test]
async fn whitespace_username_is_rejected() {
    let addr = spawn_relay().await;
    let result = connect_async(format!("ws://{addr}/ws/%20%20")).await;
    assert!(result.is_err(), "upgrade should be refused with 400");
}

#[tokio::test]
async fn health_endpoint_reports_healthy() {
    let addr = spawn_relay().await;
    let Ok(response) = reqwest::get(format!("http://{addr}/health")).await else {
        panic!("health request failed");
    };
    assert_eq!(response.status(), 200);

    let Ok(body) = response.json::<serde_json::Value>().await else {
        panic!("health body is not json");
    };
    assert_eq!(body.get("status").and_then(|v| v.as_str()), Some("healthy"));
}
