//! Client connection manager.
//!
//! [`ConnectionManager`] owns the single client socket and the state
//! machine around it: connect requests, the synchronous send guard, the
//! socket lifecycle handlers, and the query-string bootstrap. It holds
//! at most one socket at a time; a new connect request closes any prior
//! socket before constructing its replacement.

use std::fmt;

use url::Url;

use super::socket::{ClientSocket, SocketFactory};
use super::state::ConnectionState;
use super::surface::UiSurface;
use crate::domain::OutboundMessage;
use crate::error::ChatError;

/// State machine driving one chat session over one WebSocket.
pub struct ConnectionManager<U: UiSurface, F: SocketFactory> {
    surface: U,
    factory: F,
    server_url: Url,
    state: ConnectionState,
    socket: Option<F::Socket>,
    session: Option<String>,
    pending_send: Option<String>,
}

impl<U: UiSurface, F: SocketFactory> ConnectionManager<U, F> {
    /// Creates a manager in the `Disconnected` state.
    pub fn new(server_url: Url, surface: U, factory: F) -> Self {
        Self {
            surface,
            factory,
            server_url,
            state: ConnectionState::Disconnected,
            socket: None,
            session: None,
            pending_send: None,
        }
    }

    /// Returns the current connection state.
    pub fn state(&self) -> ConnectionState {
        self.state
    }

    /// Returns the generation of the current socket, if any.
    pub fn socket_generation(&self) -> Option<u64> {
        self.socket.as_ref().map(ClientSocket::generation)
    }

    /// Returns the UI surface.
    pub fn surface(&self) -> &U {
        &self.surface
    }

    /// Returns the UI surface mutably.
    pub fn surface_mut(&mut self) -> &mut U {
        &mut self.surface
    }

    /// Opens a connection for the username in the UI surface.
    ///
    /// An empty (or whitespace-only) username produces an alert and
    /// touches nothing else, in particular no prior socket. Otherwise
    /// any prior socket is closed before the new one is constructed, so
    /// at most one socket is ever open.
    pub fn connect(&mut self) {
        let raw = self.surface.username_input();
        let username = raw.trim();
        if username.is_empty() {
            self.surface.alert("Enter a username");
            return;
        }

        if let Some(mut old) = self.socket.take() {
            old.close();
        }

        let url = match session_url(&self.server_url, username) {
            Ok(url) => url,
            Err(err) => {
                tracing::error!(error = %err, "cannot build session url");
                self.state = ConnectionState::Disconnected;
                self.surface.alert("Invalid server URL");
                return;
            }
        };

        self.session = Some(username.to_string());
        self.state = ConnectionState::Connecting;
        self.socket = Some(self.factory.connect(&url));
    }

    /// Sends the message input as one JSON text frame.
    ///
    /// Synchronous guard, not a queued retry: with no socket, or a
    /// socket that is not open, this alerts "Not connected" and leaves
    /// the message input untouched. An empty recipient means broadcast.
    /// On success the message input is cleared; delivery is
    /// fire-and-forget.
    pub fn send_message(&mut self) {
        if !self.socket.as_ref().is_some_and(ClientSocket::is_open) {
            self.surface.alert("Not connected");
            return;
        }

        let recipient = self.surface.recipient_input();
        let recipient = recipient.trim();
        let to = (!recipient.is_empty()).then(|| recipient.to_string());
        let payload = OutboundMessage::new(to, self.surface.message_input());

        let frame = match payload.to_frame() {
            Ok(frame) => frame,
            Err(err) => {
                tracing::error!(error = %err, "failed to encode frame");
                return;
            }
        };

        if let Some(socket) = self.socket.as_mut() {
            match socket.send_text(&frame) {
                Ok(()) => self.surface.set_message_input(""),
                Err(err) => tracing::error!(error = %err, "failed to send frame"),
            }
        }
    }

    /// Applies the `user`, `to`, and `msg` bootstrap query parameters.
    ///
    /// With `user` present, populates the inputs and connects
    /// immediately; a `msg` value is queued and flushed on the open
    /// transition rather than sent after a fixed delay, failing through
    /// the "Not connected" alert if the connection never opens. Without
    /// `user` the query is ignored. Never fails; problems are logged.
    pub fn bootstrap(&mut self, query: &str) {
        let query = query.trim_start_matches('?');
        let mut user = None;
        let mut to = None;
        let mut msg = None;
        for (key, value) in url::form_urlencoded::parse(query.as_bytes()) {
            match key.as_ref() {
                "user" => user = Some(value.into_owned()),
                "to" => to = Some(value.into_owned()),
                "msg" => msg = Some(value.into_owned()),
                _ => {}
            }
        }

        let Some(user) = user else {
            tracing::debug!("bootstrap query has no user parameter");
            return;
        };

        self.surface.set_username_input(&user);
        if let Some(to) = to {
            self.surface.set_recipient_input(&to);
        }
        self.connect();

        if let Some(msg) = msg {
            if self.socket.is_some() {
                self.pending_send = Some(msg);
            } else {
                // Connect failed synchronously; fail the queued send
                // explicitly instead of leaving it armed.
                self.surface.alert("Not connected");
            }
        }
    }

    /// Socket open transition: reflect the connected session into the
    /// UI and flush a queued bootstrap send, if any.
    pub fn handle_open(&mut self) {
        self.state = ConnectionState::Connected;
        let username = self.session.clone().unwrap_or_default();
        self.surface.set_status(&format!("Connected as {username}"));
        self.surface.set_connect_enabled(false);

        if let Some(pending) = self.pending_send.take() {
            self.surface.set_message_input(&pending);
            self.send_message();
        }
    }

    /// Inbound frame: append the payload to the log verbatim.
    pub fn handle_message(&mut self, text: &str) {
        self.surface.append_message(text);
    }

    /// Socket closed transition: drop the handle, reset the UI, and
    /// fail any still-queued bootstrap send.
    pub fn handle_close(&mut self) {
        self.socket = None;
        self.state = ConnectionState::Disconnected;
        self.surface.set_status("Disconnected");
        self.surface.set_connect_enabled(true);

        if self.pending_send.take().is_some() {
            self.surface.alert("Not connected");
        }
    }

    /// Transport error: diagnostic log only. State changes come from
    /// the paired close event, never from here.
    pub fn handle_error(&mut self, error: &str) {
        tracing::error!(error, "websocket error");
    }
}

impl<U: UiSurface, F: SocketFactory> fmt::Debug for ConnectionManager<U, F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionManager")
            .field("state", &self.state)
            .field("session", &self.session)
            .finish_non_exhaustive()
    }
}

/// Builds `ws://host:port/ws/<username>` with the username
/// percent-encoded as a path segment.
fn session_url(base: &Url, username: &str) -> Result<Url, ChatError> {
    let mut url = base.clone();
    url.path_segments_mut()
        .map_err(|()| ChatError::Internal("server url cannot be a base".to_string()))?
        .pop_if_empty()
        .push("ws")
        .push(username);
    Ok(url)
}
