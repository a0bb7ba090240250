//! Repository trait definitions.
//!
//! Persistence the domain needs, implemented by the infrastructure layer.

use super::{error::ClientError, value_object::Nickname};

/// Locally persisted nickname, chosen once per user profile and reused
pub trait NicknameRepository: Send + Sync {
    /// The stored nickname, or `None` if none has been saved yet
    fn load(&self) -> Result<Option<Nickname>, ClientError>;

    /// Persist the nickname for later runs
    fn save(&self, nickname: &Nickname) -> Result<(), ClientError>;
}
