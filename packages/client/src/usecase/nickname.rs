//! Nickname resolution.

use crate::domain::{ClientError, Nickname, NicknameRepository};

/// Pick the nickname for this run.
///
/// An explicit nickname wins and is not persisted. Otherwise the stored one
/// is reused; if nothing is stored, `prompt` is asked once and its answer is
/// persisted for later runs.
pub fn resolve_nickname<R, P>(
    explicit: Option<Nickname>,
    repository: &R,
    prompt: P,
) -> Result<Nickname, ClientError>
where
    R: NicknameRepository + ?Sized,
    P: FnOnce() -> Result<Nickname, ClientError>,
{
    if let Some(nickname) = explicit {
        return Ok(nickname);
    }

    if let Some(nickname) = repository.load()? {
        tracing::debug!("Using stored nickname '{}'", nickname);
        return Ok(nickname);
    }

    let nickname = prompt()?;
    repository.save(&nickname)?;
    Ok(nickname)
}
