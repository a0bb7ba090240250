//! Chat message DTOs carried in STOMP frame bodies.

use serde::{Deserialize, Serialize};

/// Message type enum
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum MessageType {
    Enter,
    Leave,
    /// Brokers that predate presence messages omit `type`; treat as chat text.
    #[default]
    Talk,
}

/// Chat message published to and delivered from the room
///
/// Every field may be missing or `null` on delivery; peers are not bound by
/// this client's validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    #[serde(default)]
    pub room_id: Option<String>,
    #[serde(default)]
    pub sender: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub r#type: Option<MessageType>,
}
