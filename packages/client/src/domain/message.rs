//! Chat messages exchanged in a room.

use std::fmt;

use super::value_object::{MessageContent, Nickname, RoomId};

/// Kind of a chat message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageType {
    /// A member joined the room
    Enter,
    /// A member left the room gracefully
    Leave,
    /// Ordinary chat text
    Talk,
}

impl fmt::Display for MessageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            MessageType::Enter => "ENTER",
            MessageType::Leave => "LEAVE",
            MessageType::Talk => "TALK",
        };
        f.write_str(label)
    }
}

/// A message in a room. Immutable once constructed.
///
/// Messages built by this client go through the validated constructors.
/// Messages delivered by the broker keep whatever room and sender the peer
/// put on the wire.
///
/// Presence messages (ENTER / LEAVE) carry a human-readable content so that
/// clients which only render `content` still show something sensible.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    room_id: String,
    sender: String,
    content: String,
    kind: MessageType,
}

impl ChatMessage {
    /// Presence announcement published once per successful connection.
    pub fn enter(room_id: RoomId, sender: Nickname) -> Self {
        let content = format!("{} entered the room", sender);
        Self::from_parts(room_id.into_string(), sender.into_string(), content, MessageType::Enter)
    }

    /// Presence announcement published on graceful teardown.
    pub fn leave(room_id: RoomId, sender: Nickname) -> Self {
        let content = format!("{} left the room", sender);
        Self::from_parts(room_id.into_string(), sender.into_string(), content, MessageType::Leave)
    }

    pub fn talk(room_id: RoomId, sender: Nickname, content: MessageContent) -> Self {
        Self::from_parts(
            room_id.into_string(),
            sender.into_string(),
            content.into_string(),
            MessageType::Talk,
        )
    }

    /// Build a message from raw parts, e.g. a decoded delivery.
    ///
    /// Nothing is validated: peers are not bound by this client's rules.
    pub fn from_parts(
        room_id: impl Into<String>,
        sender: impl Into<String>,
        content: impl Into<String>,
        kind: MessageType,
    ) -> Self {
        Self {
            room_id: room_id.into(),
            sender: sender.into(),
            content: content.into(),
            kind,
        }
    }

    pub fn room_id(&self) -> &str {
        &self.room_id
    }

    pub fn sender(&self) -> &str {
        &self.sender
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn kind(&self) -> MessageType {
        self.kind
    }

    /// Whether this message was sent under the given nickname
    pub fn is_from(&self, nickname: &Nickname) -> bool {
        self.sender == nickname.as_str()
    }
}
