//! Live connection registry keyed by username.
//!
//! [`ConnectionRegistry`] maps each username to the delivery channel of
//! its live WebSocket connection. Connecting a username that is already
//! registered replaces the old entry; the replaced connection's outbox
//! closes and its loop exits.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::{RwLock, mpsc};

use super::Username;

/// Identifier for one registered connection.
///
/// Disconnects are guarded by the session id so a replaced connection
/// cannot evict its successor from the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionId(u64);

#[derive(Debug)]
struct Connection {
    session: SessionId,
    outbox: mpsc::Sender<String>,
}

/// Registry of all live connections, keyed by username.
///
/// # Concurrency
///
/// The map is behind a single [`RwLock`]; delivery happens on cloned
/// senders after the lock is released, so a slow receiver never holds
/// the registry lock.
#[derive(Debug)]
pub struct ConnectionRegistry {
    connections: RwLock<HashMap<Username, Connection>>,
    next_session: AtomicU64,
    outbox_capacity: usize,
}

impl ConnectionRegistry {
    /// Creates an empty registry with the given per-connection outbox
    /// capacity.
    #[must_use]
    pub fn new(outbox_capacity: usize) -> Self {
        Self {
            connections: RwLock::new(HashMap::new()),
            next_session: AtomicU64::new(0),
            outbox_capacity,
        }
    }

    /// Registers a connection for `username`, returning its session id
    /// and the receiving half of its delivery queue.
    ///
    /// Any previous entry for the same username is replaced; dropping
    /// its sender closes the old connection's outbox.
    pub async fn connect(&self, username: Username) -> (SessionId, mpsc::Receiver<String>) {
        let session = SessionId(self.next_session.fetch_add(1, Ordering::Relaxed));
        let (outbox, rx) = mpsc::channel(self.outbox_capacity);
        let total = {
            let mut map = self.connections.write().await;
            map.insert(username.clone(), Connection { session, outbox });
            map.len()
        };
        tracing::info!(%username, total, "connection registered");
        (session, rx)
    }

    /// Removes the connection for `username` if it still belongs to
    /// `session`. Returns `true` if an entry was removed.
    pub async fn disconnect(&self, username: &Username, session: SessionId) -> bool {
        let (removed, total) = {
            let mut map = self.connections.write().await;
            let removed = match map.get(username) {
                Some(conn) if conn.session == session => {
                    map.remove(username);
                    true
                }
                _ => false,
            };
            (removed, map.len())
        };
        if removed {
            tracing::info!(%username, total, "connection removed");
        }
        removed
    }

    /// Delivers `message` to the named recipient, if registered.
    ///
    /// Returns `false` if the recipient is unknown or its connection is
    /// gone; the message is silently dropped in that case.
    pub async fn send_personal(&self, username: &str, message: String) -> bool {
        let outbox = {
            let map = self.connections.read().await;
            map.get(username).map(|conn| conn.outbox.clone())
        };
        match outbox {
            Some(outbox) => outbox.send(message).await.is_ok(),
            None => false,
        }
    }

    /// Delivers `message` to every registered connection, sender
    /// included. Returns the number of successful deliveries.
    pub async fn broadcast(&self, message: String) -> usize {
        let mut outboxes = Vec::new();
        {
            let map = self.connections.read().await;
            for conn in map.values() {
                outboxes.push(conn.outbox.clone());
            }
        }
        let mut delivered = 0;
        for outbox in outboxes {
            if outbox.send(message.clone()).await.is_ok() {
                delivered += 1;
            }
        }
        delivered
    }

    /// Returns the number of registered connections.
    pub async fn len(&self) -> usize {
        self.connections.read().await.len()
    }

    /// Returns `true` if no connection is registered.
    pub async fn is_empty(&self) -> bool {
        self.connections.read().await.is_empty()
    }
}
