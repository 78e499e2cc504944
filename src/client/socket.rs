//! Client socket abstraction and tokio-tungstenite implementation.
//!
//! The connection manager only sees the [`ClientSocket`] and
//! [`SocketFactory`] traits, so the state machine is testable without a
//! network. [`WsFactory`] is the real implementation: each socket runs
//! one spawned task that connects, pumps frames, and reports lifecycle
//! events tagged with a per-socket generation number. Events from a
//! replaced socket carry a stale generation and are discarded by the
//! driver.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use futures_util::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;
use url::Url;

use crate::error::ChatError;

/// Lifecycle event emitted by a client socket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SocketEvent {
    /// The socket finished opening and frames may be sent.
    Open,
    /// A text frame arrived.
    Message(String),
    /// Transport-level error. Does not imply the socket is closed; a
    /// separate [`SocketEvent::Closed`] follows when it is.
    Error(String),
    /// The socket is closed and will emit no further events.
    Closed,
}

/// Handle to one client WebSocket connection.
pub trait ClientSocket {
    /// Generation number distinguishing this socket from its
    /// predecessors and successors.
    fn generation(&self) -> u64;
    /// Returns `true` while the socket is in the open state.
    fn is_open(&self) -> bool;
    /// Sends one text frame.
    ///
    /// # Errors
    ///
    /// Returns [`ChatError::Transport`] if the socket task is gone.
    fn send_text(&mut self, text: &str) -> Result<(), ChatError>;
    /// Requests the socket to close. Idempotent.
    fn close(&mut self);
}

/// Creates client sockets. Connection failures are not reported here;
/// they arrive asynchronously as [`SocketEvent::Error`] followed by
/// [`SocketEvent::Closed`].
pub trait SocketFactory {
    /// Concrete socket type produced by this factory.
    type Socket: ClientSocket;

    /// Starts opening a connection to `url` and returns its handle.
    fn connect(&mut self, url: &Url) -> Self::Socket;
}

#[derive(Debug)]
enum SocketCommand {
    SendText(String),
    Close,
}

/// Real WebSocket handle backed by a spawned tokio-tungstenite task.
#[derive(Debug)]
pub struct WsSocket {
    generation: u64,
    open: Arc<AtomicBool>,
    cmd_tx: mpsc::UnboundedSender<SocketCommand>,
}

impl ClientSocket for WsSocket {
    fn generation(&self) -> u64 {
        self.generation
    }

    fn is_open(&self) -> bool {
        self.open.load(Ordering::Acquire)
    }

    fn send_text(&mut self, text: &str) -> Result<(), ChatError> {
        self.cmd_tx
            .send(SocketCommand::SendText(text.to_string()))
            .map_err(|_| ChatError::Transport("socket task terminated".to_string()))
    }

    fn close(&mut self) {
        // The task may already be gone; that counts as closed.
        let _ = self.cmd_tx.send(SocketCommand::Close);
        self.open.store(false, Ordering::Release);
    }
}

/// Factory producing [`WsSocket`]s whose events arrive on a shared
/// channel, tagged with each socket's generation.
#[derive(Debug)]
pub struct WsFactory {
    event_tx: mpsc::UnboundedSender<(u64, SocketEvent)>,
    next_generation: u64,
}

impl WsFactory {
    /// Creates a factory and the receiving half of its event channel.
    #[must_use]
    pub fn new() -> (Self, mpsc::UnboundedReceiver<(u64, SocketEvent)>) {
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        (
            Self {
                event_tx,
                next_generation: 0,
            },
            event_rx,
        )
    }
}

impl SocketFactory for WsFactory {
    type Socket = WsSocket;

    fn connect(&mut self, url: &Url) -> WsSocket {
        let generation = self.next_generation;
        self.next_generation += 1;

        let open = Arc::new(AtomicBool::new(false));
        let (cmd_tx, cmd_rx) = mpsc::unbounded_channel();

        tokio::spawn(run_socket(
            url.to_string(),
            generation,
            cmd_rx,
            self.event_tx.clone(),
            Arc::clone(&open),
        ));

        WsSocket {
            generation,
            open,
            cmd_tx,
        }
    }
}

/// Socket task: connect, then pump commands and inbound frames until
/// either side closes. Always ends with a `Closed` event.
async fn run_socket(
    url: String,
    generation: u64,
    mut cmd_rx: mpsc::UnboundedReceiver<SocketCommand>,
    event_tx: mpsc::UnboundedSender<(u64, SocketEvent)>,
    open: Arc<AtomicBool>,
) {
    match connect_async(url.as_str()).await {
        Ok((stream, _)) => {
            open.store(true, Ordering::Release);
            let _ = event_tx.send((generation, SocketEvent::Open));

            let (mut ws_tx, mut ws_rx) = stream.split();
            loop {
                tokio::select! {
                    cmd = cmd_rx.recv() => {
                        match cmd {
                            Some(SocketCommand::SendText(text)) => {
                                if ws_tx.send(Message::text(text)).await.is_err() {
                                    break;
                                }
                            }
                            Some(SocketCommand::Close) | None => {
                                let _ = ws_tx.send(Message::Close(None)).await;
                                break;
                            }
                        }
                    }
                    frame = ws_rx.next() => {
                        match frame {
                            Some(Ok(Message::Text(text))) => {
                                let _ = event_tx.send((
                                    generation,
                                    SocketEvent::Message(text.as_str().to_string()),
                                ));
                            }
                            Some(Ok(Message::Close(_))) | None => break,
                            Some(Err(err)) => {
                                let _ = event_tx
                                    .send((generation, SocketEvent::Error(err.to_string())));
                                break;
                            }
                            _ => {}
                        }
                    }
                }
            }
        }
        Err(err) => {
            let _ = event_tx.send((generation, SocketEvent::Error(err.to_string())));
        }
    }

    open.store(false, Ordering::Release);
    let _ = event_tx.send((generation, SocketEvent::Closed));
}
