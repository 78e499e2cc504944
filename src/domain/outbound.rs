//! Wire frame exchanged between client and relay.
//!
//! Every outbound text frame is the JSON object `{"to": …, "message": …}`.
//! A null or missing `to` means broadcast. Inbound frames are opaque
//! display text from the client's perspective and have no schema.

use serde::{Deserialize, Serialize};

use crate::error::ChatError;

/// One outbound chat message as sent over the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutboundMessage {
    /// Recipient username. `None` means broadcast to everyone.
    #[serde(default)]
    pub to: Option<String>,
    /// Message body.
    #[serde(default)]
    pub message: String,
}

impl OutboundMessage {
    /// Creates a new message. An empty or whitespace-only recipient is
    /// normalized to `None` (broadcast).
    #[must_use]
    pub fn new(to: Option<String>, message: String) -> Self {
        let to = to.filter(|t| !t.trim().is_empty());
        Self { to, message }
    }

    /// Serializes this message to a single JSON text frame.
    ///
    /// # Errors
    ///
    /// Returns [`ChatError::Serialization`] if JSON encoding fails.
    pub fn to_frame(&self) -> Result<String, ChatError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Parses a text frame received by the relay.
    ///
    /// Malformed JSON falls back to treating the entire text as a
    /// broadcast message body, matching the relay's lenient intake.
    #[must_use]
    pub fn parse(text: &str) -> Self {
        serde_json::from_str(text).unwrap_or_else(|_| Self {
            to: None,
            message: text.to_string(),
        })
    }

    /// Returns the recipient, treating an empty string as broadcast.
    #[must_use]
    pub fn recipient(&self) -> Option<&str> {
        self.to.as_deref().filter(|t| !t.trim().is_empty())
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn broadcast_serializes_null_recipient() {
        let msg = OutboundMessage::new(None, "hi".to_string());
        let Ok(frame) = msg.to_frame() else {
            panic!("serialization failed");
        };
        assert_eq!(frame, r#"{"to":null,"message":"hi"}"#);
    }

    #[test]
    fn private_serializes_recipient() {
        let msg = OutboundMessage::new(Some("bob".to_string()), "hi".to_string());
        let Ok(frame) = msg.to_frame() else {
            panic!("serialization failed");
        };
        assert_eq!(frame, r#"{"to":"bob","message":"hi"}"#);
    }

    #[test]
    fn empty_recipient_normalized_to_broadcast() {
        let msg = OutboundMessage::new(Some("  ".to_string()), "hi".to_string());
        assert_eq!(msg.to, None);
        assert_eq!(msg.recipient(), None);
    }

    #[test]
    fn parse_reads_private_frame() {
        let msg = OutboundMessage::parse(r#"{"to": "bob", "message": "hello bob"}"#);
        assert_eq!(msg.recipient(), Some("bob"));
        assert_eq!(msg.message, "hello bob");
    }

    #[test]
    fn parse_missing_to_is_broadcast() {
        let msg = OutboundMessage::parse(r#"{"message": "hello everyone"}"#);
        assert_eq!(msg.recipient(), None);
        assert_eq!(msg.message, "hello everyone");
    }

    #[test]
    fn parse_malformed_falls_back_to_broadcast_text() {
        let msg = OutboundMessage::parse("plain hello");
        assert_eq!(msg.recipient(), None);
        assert_eq!(msg.message, "plain hello");
    }
}
