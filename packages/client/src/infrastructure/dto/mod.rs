//! Data Transfer Objects for the JSON wire format.
//!
//! - `websocket`: message bodies exchanged through the broker
//! - `conversion`: mapping between DTOs and domain types

pub mod conversion;
pub mod websocket;

pub use conversion::{DecodeError, decode_chat_message, encode_chat_message};
