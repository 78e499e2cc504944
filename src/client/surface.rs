//! UI surface abstraction.
//!
//! The connection manager does not own a UI; it drives a [`UiSurface`]
//! that exposes the username, recipient, and message inputs plus the
//! status line, message log, and connect control. The `chat-client`
//! binary implements this over a terminal; tests use a recording mock.

/// Collaborating UI surface driven by the connection manager.
pub trait UiSurface {
    /// Current contents of the username input.
    fn username_input(&self) -> String;
    /// Current contents of the recipient input.
    fn recipient_input(&self) -> String;
    /// Current contents of the message input.
    fn message_input(&self) -> String;

    /// Replaces the username input.
    fn set_username_input(&mut self, value: &str);
    /// Replaces the recipient input.
    fn set_recipient_input(&mut self, value: &str);
    /// Replaces the message input.
    fn set_message_input(&mut self, value: &str);

    /// Updates the connection status line.
    fn set_status(&mut self, text: &str);
    /// Enables or disables the connect control.
    fn set_connect_enabled(&mut self, enabled: bool);
    /// Appends one inbound payload to the message log, verbatim.
    fn append_message(&mut self, text: &str);
    /// Shows a user-visible notice (a blocking alert in a browser UI).
    fn alert(&mut self, text: &str);
}
