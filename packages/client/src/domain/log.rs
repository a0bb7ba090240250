//! Local ordered log of received messages.

use super::message::ChatMessage;

/// A received message together with the local time it arrived
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggedMessage {
    pub message: ChatMessage,
    /// Unix timestamp (milliseconds) when the message was delivered locally
    pub received_at: i64,
}

/// Append-only log of messages in the order the transport delivered them.
///
/// No de-duplication or re-ordering happens here.
#[derive(Debug, Clone, Default)]
pub struct MessageLog {
    entries: Vec<LoggedMessage>,
}

impl MessageLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, message: ChatMessage, received_at: i64) {
        self.entries.push(LoggedMessage {
            message,
            received_at,
        });
    }

    pub fn entries(&self) -> &[LoggedMessage] {
        &self.entries
    }

    pub fn messages(&self) -> impl Iterator<Item = &ChatMessage> {
        self.entries.iter().map(|entry| &entry.message)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
