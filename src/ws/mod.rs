//! Server WebSocket layer: upgrade handling and per-connection routing.
//!
//! The endpoint at `/ws/{username}` upgrades to a WebSocket and relays
//! private and broadcast messages between registered connections.

pub mod connection;
pub mod handler;
