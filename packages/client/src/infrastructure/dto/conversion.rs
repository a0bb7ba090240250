//! Conversion logic between DTOs and domain entities.

use thiserror::Error;

use crate::domain;
use crate::infrastructure::dto::websocket as dto;

/// Why a delivered body could not be turned into a domain message
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

// ========================================
// DTO → Domain Entity
// ========================================

impl From<dto::MessageType> for domain::MessageType {
    fn from(dto: dto::MessageType) -> Self {
        match dto {
            dto::MessageType::Enter => Self::Enter,
            dto::MessageType::Leave => Self::Leave,
            dto::MessageType::Talk => Self::Talk,
        }
    }
}

impl From<dto::ChatMessage> for domain::ChatMessage {
    fn from(dto: dto::ChatMessage) -> Self {
        Self::from_parts(
            dto.room_id.unwrap_or_default(),
            dto.sender.unwrap_or_default(),
            dto.content.unwrap_or_default(),
            dto.r#type.unwrap_or_default().into(),
        )
    }
}

// ========================================
// Domain Entity → DTO
// ========================================

impl From<domain::MessageType> for dto::MessageType {
    fn from(model: domain::MessageType) -> Self {
        match model {
            domain::MessageType::Enter => Self::Enter,
            domain::MessageType::Leave => Self::Leave,
            domain::MessageType::Talk => Self::Talk,
        }
    }
}

impl From<&domain::ChatMessage> for dto::ChatMessage {
    fn from(model: &domain::ChatMessage) -> Self {
        Self {
            room_id: Some(model.room_id().to_string()),
            sender: Some(model.sender().to_string()),
            content: Some(model.content().to_string()),
            r#type: Some(model.kind().into()),
        }
    }
}

/// Serialize a domain message into a frame body
pub fn encode_chat_message(message: &domain::ChatMessage) -> Result<String, serde_json::Error> {
    serde_json::to_string(&dto::ChatMessage::from(message))
}

/// Parse a frame body into a domain message
///
/// Only malformed JSON or an unknown `type` is an error. Missing or `null`
/// fields decode as empty strings (or TALK for `type`).
pub fn decode_chat_message(body: &str) -> Result<domain::ChatMessage, DecodeError> {
    let dto: dto::ChatMessage = serde_json::from_str(body)?;
    Ok(dto.into())
}
