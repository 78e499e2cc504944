//! Chat client: connection manager, socket abstraction, UI surface.
//!
//! The client half of the crate. [`ConnectionManager`] is the state
//! machine (one socket, explicit lifecycle transitions); [`ChatClient`]
//! wires it to the real tokio-tungstenite transport and dispatches
//! socket events on the caller's task, single-threaded and cooperative.

pub mod manager;
pub mod socket;
pub mod state;
pub mod surface;

use std::fmt;

use tokio::sync::mpsc;
use url::Url;

pub use manager::ConnectionManager;
pub use socket::{ClientSocket, SocketEvent, SocketFactory, WsFactory, WsSocket};
pub use state::ConnectionState;
pub use surface::UiSurface;

/// Connection manager bound to the real WebSocket transport.
///
/// Call [`ChatClient::drive`] in a loop (or under `select!`) to pump
/// socket events; all lifecycle handling happens inside that call, on
/// the caller's task.
pub struct ChatClient<U: UiSurface> {
    manager: ConnectionManager<U, WsFactory>,
    events: mpsc::UnboundedReceiver<(u64, SocketEvent)>,
}

impl<U: UiSurface> ChatClient<U> {
    /// Creates a client that connects to `server_url` and drives
    /// `surface`.
    #[must_use]
    pub fn new(server_url: Url, surface: U) -> Self {
        let (factory, events) = WsFactory::new();
        Self {
            manager: ConnectionManager::new(server_url, surface, factory),
            events,
        }
    }

    /// Opens a connection for the username in the UI surface.
    pub fn connect(&mut self) {
        self.manager.connect();
    }

    /// Sends the message input as one JSON text frame.
    pub fn send_message(&mut self) {
        self.manager.send_message();
    }

    /// Applies the `user`, `to`, and `msg` bootstrap query parameters.
    pub fn bootstrap(&mut self, query: &str) {
        self.manager.bootstrap(query);
    }

    /// Returns the current connection state.
    #[must_use]
    pub fn state(&self) -> ConnectionState {
        self.manager.state()
    }

    /// Returns the UI surface.
    pub fn surface(&self) -> &U {
        self.manager.surface()
    }

    /// Returns the UI surface mutably.
    pub fn surface_mut(&mut self) -> &mut U {
        self.manager.surface_mut()
    }

    /// Waits for the next socket event and dispatches it.
    ///
    /// Events from a replaced socket carry a stale generation and are
    /// discarded, so a lingering close from an old connection cannot
    /// disturb the current one. Returns `false` if the event channel is
    /// gone. Cancel-safe.
    pub async fn drive(&mut self) -> bool {
        let Some((generation, event)) = self.events.recv().await else {
            return false;
        };
        if self.manager.socket_generation() == Some(generation) {
            match event {
                SocketEvent::Open => self.manager.handle_open(),
                SocketEvent::Message(text) => self.manager.handle_message(&text),
                SocketEvent::Error(error) => self.manager.handle_error(&error),
                SocketEvent::Closed => self.manager.handle_close(),
            }
        }
        true
    }
}

impl<U: UiSurface> fmt::Debug for ChatClient<U> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChatClient")
            .field("manager", &self.manager)
            .finish_non_exhaustive()
    }
}
