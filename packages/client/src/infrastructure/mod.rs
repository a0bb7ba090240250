//! Infrastructure layer: the STOMP-over-WebSocket transport, the JSON wire
//! format and local persistence.

pub mod dto;
pub mod repository;
pub mod stomp;
