//! # chat-relay
//!
//! WebSocket chat relay with private and broadcast messaging, plus an
//! embeddable client. One connection per username; frames are JSON text
//! of the shape `{"to": string|null, "message": string}` where a null
//! recipient means broadcast. Inbound frames are opaque display text to
//! the client.
//!
//! ## Architecture
//!
//! ```text
//! chat-client (bin)                 chat-relay (bin)
//!     │                                 │
//!     ├── ChatClient (client/)          ├── REST Handler (api/)
//!     │   ├── ConnectionManager         ├── WS Handler (ws/)
//!     │   ├── UiSurface                 │
//!     │   └── WsFactory ── ws:// ────────┤
//!     │                                 ├── ConnectionRegistry (domain/)
//!     │                                 └── per-connection relay loop
//! ```

pub mod api;
pub mod app_state;
pub mod client;
pub mod config;
pub mod domain;
pub mod error;
pub mod ws;

use axum::Router;
use axum::routing::get;

use crate::app_state::AppState;

/// Builds the full application router: REST endpoints plus the
/// WebSocket endpoint at `/ws/{username}`.
pub fn build_app() -> Router<AppState> {
    Router::new()
        .merge(api::build_router())
        .route("/ws/{username}", get(ws::handler::ws_handler))
}
