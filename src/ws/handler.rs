//! Axum WebSocket upgrade handler.

use axum::extract::ws::WebSocketUpgrade;
use axum::extract::{Path, State};
use axum::response::{IntoResponse, Response};

use super::connection::run_connection;
use crate::app_state::AppState;
use crate::domain::Username;

/// `GET /ws/{username}` — Upgrade HTTP connection to WebSocket.
///
/// The path segment is percent-decoded by Axum and validated before the
/// upgrade; an empty username is rejected with 400.
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    Path(username): Path<String>,
    State(state): State<AppState>,
) -> Response {
    let username = match Username::parse(&username) {
        Ok(username) => username,
        Err(err) => return err.into_response(),
    };

    ws.on_upgrade(move |socket| run_connection(socket, username, state))
        .into_response()
}
