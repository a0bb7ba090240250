//! Value Objects for domain models.
//!
//! Value Objects are immutable objects that represent values in the domain.
//! They are compared by their value, not by identity.

use std::fmt;

use super::error::ValueObjectError;

const NICKNAME_MAX_CHARS: usize = 100;
const ROOM_ID_MAX_CHARS: usize = 100;
const MESSAGE_CONTENT_MAX_CHARS: usize = 10000;

/// Nickname value object.
///
/// The display name a user chats under. Stored trimmed.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Nickname(String);

impl Nickname {
    /// Create a new Nickname.
    ///
    /// # Arguments
    ///
    /// * `name` - The nickname; surrounding whitespace is removed
    ///
    /// # Returns
    ///
    /// A Result containing the Nickname or an error if validation fails
    pub fn new(name: impl AsRef<str>) -> Result<Self, ValueObjectError> {
        let name = name.as_ref().trim();
        if name.is_empty() {
            return Err(ValueObjectError::NicknameEmpty);
        }
        let len = name.chars().count();
        if len > NICKNAME_MAX_CHARS {
            return Err(ValueObjectError::NicknameTooLong {
                max: NICKNAME_MAX_CHARS,
                actual: len,
            });
        }
        if name.chars().any(char::is_control) {
            return Err(ValueObjectError::NicknameInvalidCharacter);
        }
        Ok(Self(name.to_string()))
    }

    /// Get the inner string value.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Convert to owned String.
    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for Nickname {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Room identifier value object.
///
/// Embedded verbatim into broker destinations, so only characters that are
/// safe in a destination segment are accepted.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RoomId(String);

impl RoomId {
    /// Room joined when none is configured
    pub const DEFAULT: &'static str = "room1";

    /// Create a new RoomId.
    ///
    /// # Arguments
    ///
    /// * `id` - The room identifier string
    ///
    /// # Returns
    ///
    /// A Result containing the RoomId or an error if validation fails
    pub fn new(id: impl Into<String>) -> Result<Self, ValueObjectError> {
        let id = id.into();
        if id.is_empty() {
            return Err(ValueObjectError::RoomIdEmpty);
        }
        let len = id.chars().count();
        if len > ROOM_ID_MAX_CHARS {
            return Err(ValueObjectError::RoomIdTooLong {
                max: ROOM_ID_MAX_CHARS,
                actual: len,
            });
        }
        if !id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        {
            return Err(ValueObjectError::RoomIdInvalidFormat(id));
        }
        Ok(Self(id))
    }

    /// Topic the room's messages are broadcast on.
    pub fn topic(&self) -> String {
        format!("/topic/chat.{}", self.0)
    }

    /// Application destination messages for the room are published to.
    pub fn publish_destination(&self) -> String {
        format!("/app/chat.sendMessage.{}", self.0)
    }

    /// Get the inner string value.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Convert to owned String.
    pub fn into_string(self) -> String {
        self.0
    }
}

impl Default for RoomId {
    fn default() -> Self {
        Self(Self::DEFAULT.to_string())
    }
}

impl fmt::Display for RoomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Message content value object.
///
/// Outgoing chat text. Validation looks at the trimmed text but the content
/// is kept exactly as typed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageContent(String);

impl MessageContent {
    /// Create a new MessageContent.
    ///
    /// # Arguments
    ///
    /// * `content` - The message content string
    ///
    /// # Returns
    ///
    /// A Result containing the MessageContent or an error if validation fails
    pub fn new(content: impl Into<String>) -> Result<Self, ValueObjectError> {
        let content = content.into();
        if content.trim().is_empty() {
            return Err(ValueObjectError::MessageContentEmpty);
        }
        let len = content.chars().count();
        if len > MESSAGE_CONTENT_MAX_CHARS {
            return Err(ValueObjectError::MessageContentTooLong {
                max: MESSAGE_CONTENT_MAX_CHARS,
                actual: len,
            });
        }
        Ok(Self(content))
    }

    /// Get the inner string value.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Convert to owned String.
    pub fn into_string(self) -> String {
        self.0
    }
}
