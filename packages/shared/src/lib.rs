//! Shared utilities for the stomproom workspace.

pub mod logger;
pub mod time;
