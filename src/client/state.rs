//! Client connection lifecycle state.

use std::fmt;

/// Lifecycle state of the client's single WebSocket connection.
///
/// Transitions:
///
/// | From         | Event            | To           |
/// |--------------|------------------|--------------|
/// | Disconnected | connect request  | Connecting   |
/// | Connecting   | socket open      | Connected    |
/// | Connecting   | socket closed    | Disconnected |
/// | Connected    | socket closed    | Disconnected |
///
/// There is no reconnect-on-drop: `Disconnected` is terminal until the
/// user connects again. Transport errors alone do not change state; the
/// paired close event does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConnectionState {
    /// No socket exists.
    #[default]
    Disconnected,
    /// A socket has been created but has not finished opening.
    Connecting,
    /// The socket is open and frames may be sent.
    Connected,
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Disconnected => write!(f, "disconnected"),
            Self::Connecting => write!(f, "connecting"),
            Self::Connected => write!(f, "connected"),
        }
    }
}
