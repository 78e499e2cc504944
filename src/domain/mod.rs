//! Domain layer: usernames, wire frames, and the connection registry.

pub mod outbound;
pub mod registry;
pub mod username;

pub use outbound::OutboundMessage;
pub use registry::{ConnectionRegistry, SessionId};
pub use username::Username;
