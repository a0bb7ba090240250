//! UseCase layer
//!
//! Application operations built on the domain and the transport interface.
//!
//! - `session`: room membership lifecycle (`ChatSession`)
//! - `nickname`: choosing the nickname a session runs under

pub mod nickname;
pub mod session;

#[cfg(test)]
pub(crate) mod fake;

pub use nickname::resolve_nickname;
pub use session::{ChatSession, DisconnectReason, SessionConfig};
