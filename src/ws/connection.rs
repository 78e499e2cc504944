//! Per-connection relay loop and message routing.
//!
//! Each connection runs a select loop over its WebSocket and its
//! delivery queue, mirroring the registry's at-most-one-connection-per-
//! username rule: when a username reconnects, the replaced connection's
//! queue closes and its loop exits.

use axum::extract::ws::{Message, WebSocket};
use futures_util::{SinkExt, StreamExt};

use crate::app_state::AppState;
use crate::domain::{ConnectionRegistry, OutboundMessage, Username};

/// Runs the relay loop for a single WebSocket connection.
///
/// - Reads text frames from the client and routes them.
/// - Forwards queued deliveries from the registry to the client.
pub async fn run_connection(socket: WebSocket, username: Username, state: AppState) {
    let (mut ws_tx, mut ws_rx) = socket.split();
    let (session, mut outbox) = state.registry.connect(username.clone()).await;
    tracing::info!(%username, "client connected");

    loop {
        tokio::select! {
            // Incoming frame from the client
            frame = ws_rx.next() => {
                match frame {
                    Some(Ok(Message::Text(text))) => {
                        route_frame(&state.registry, &username, text.as_str()).await;
                    }
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Err(err)) => {
                        tracing::debug!(%username, error = %err, "websocket read error");
                        break;
                    }
                    _ => {}
                }
            }
            // Queued delivery for this client
            delivery = outbox.recv() => {
                match delivery {
                    Some(text) => {
                        if ws_tx.send(Message::text(text)).await.is_err() {
                            break;
                        }
                    }
                    // Queue closed: this connection was replaced.
                    None => break,
                }
            }
        }
    }

    // Announce the departure, unless this connection was replaced and
    // the username is still live on its successor.
    if state.registry.disconnect(&username, session).await {
        state
            .registry
            .broadcast(format!("{username} left the chat"))
            .await;
    }
    tracing::info!(%username, "client disconnected");
}

/// Routes one text frame from `from` to its destination.
///
/// A frame with a recipient is delivered privately with a confirmation
/// echo to the sender; anything else is broadcast to every connection.
/// Unknown recipients are silently dropped.
pub(crate) async fn route_frame(registry: &ConnectionRegistry, from: &Username, text: &str) {
    let payload = OutboundMessage::parse(text);
    let to = payload.recipient().map(str::to_string);
    let message = payload.message;

    if let Some(to) = to.as_deref() {
        tracing::info!(%from, to, "private message");
        registry
            .send_personal(to, format!("(private) {from}: {message}"))
            .await;
        // Echo to the sender for confirmation.
        registry
            .send_personal(from.as_str(), format!("(to {to}) You: {message}"))
            .await;
    } else {
        tracing::info!(%from, "broadcast message");
        registry.broadcast(format!("{from}: {message}")).await;
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    fn name(raw: &str) -> Username {
        let Ok(username) = Username::parse(raw) else {
            panic!("valid username");
        };
        username
    }

    #[tokio::test]
    async fn private_frame_delivers_and_echoes() {
        let registry = ConnectionRegistry::new(8);
        let (_, mut alice_rx) = registry.connect(name("alice")).await;
        let (_, mut bob_rx) = registry.connect(name("bob")).await;

        route_frame(
            &registry,
            &name("alice"),
            r#"{"to": "bob", "message": "hello bob"}"#,
        )
        .await;

        assert_eq!(
            bob_rx.recv().await.as_deref(),
            Some("(private) alice: hello bob")
        );
        assert_eq!(
            alice_rx.recv().await.as_deref(),
            Some("(to bob) You: hello bob")
        );
    }

    #[tokio::test]
    async fn broadcast_frame_reaches_everyone() {
        let registry = ConnectionRegistry::new(8);
        let (_, mut alice_rx) = registry.connect(name("alice")).await;
        let (_, mut bob_rx) = registry.connect(name("bob")).await;

        route_frame(&registry, &name("alice"), r#"{"message": "hello everyone"}"#).await;

        assert_eq!(alice_rx.recv().await.as_deref(), Some("alice: hello everyone"));
        assert_eq!(bob_rx.recv().await.as_deref(), Some("alice: hello everyone"));
    }

    #[tokio::test]
    async fn malformed_frame_broadcasts_raw_text() {
        let registry = ConnectionRegistry::new(8);
        let (_, mut bob_rx) = registry.connect(name("bob")).await;

        route_frame(&registry, &name("alice"), "plain hello").await;

        assert_eq!(bob_rx.recv().await.as_deref(), Some("alice: plain hello"));
    }

    #[tokio::test]
    async fn private_to_unknown_recipient_only_echoes() {
        let registry = ConnectionRegistry::new(8);
        let (_, mut alice_rx) = registry.connect(name("alice")).await;

        route_frame(
            &registry,
            &name("alice"),
            r#"{"to": "ghost", "message": "anyone?"}"#,
        )
        .await;

        assert_eq!(
            alice_rx.recv().await.as_deref(),
            Some("(to ghost) You: anyone?")
        );
    }
}
