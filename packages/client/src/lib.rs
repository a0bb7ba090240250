//! STOMP-over-WebSocket chat client library.
//!
//! This library provides a chat session that joins a single room on an
//! external STOMP broker, announces presence and exchanges chat messages,
//! plus the terminal UI that drives it.

// layers
pub mod domain;
pub mod infrastructure;
pub mod ui;
pub mod usecase;

pub mod config;
