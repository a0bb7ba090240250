//! File-backed nickname repository.
//!
//! The nickname is kept as a single line in
//! `$XDG_CONFIG_HOME/stomproom/nickname`, falling back to
//! `$HOME/.config/stomproom/nickname`.

use std::{
    fs, io,
    path::{Path, PathBuf},
};

use crate::domain::{ClientError, Nickname, NicknameRepository};

const APP_DIR: &str = "stomproom";
const FILE_NAME: &str = "nickname";

#[derive(Debug, Clone)]
pub struct FileNicknameRepository {
    path: PathBuf,
}

impl FileNicknameRepository {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Default location, or `None` when neither `XDG_CONFIG_HOME` nor `HOME` is set
    pub fn default_path() -> Option<PathBuf> {
        let config_dir = std::env::var_os("XDG_CONFIG_HOME")
            .filter(|dir| !dir.is_empty())
            .map(PathBuf::from)
            .or_else(|| std::env::var_os("HOME").map(|home| PathBuf::from(home).join(".config")))?;
        Some(config_dir.join(APP_DIR).join(FILE_NAME))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl NicknameRepository for FileNicknameRepository {
    fn load(&self) -> Result<Option<Nickname>, ClientError> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        match Nickname::new(&raw) {
            Ok(nickname) => Ok(Some(nickname)),
            Err(e) => {
                tracing::warn!(
                    "Ignoring unusable nickname stored in {}: {}",
                    self.path.display(),
                    e
                );
                Ok(None)
            }
        }
    }

    fn save(&self, nickname: &Nickname) -> Result<(), ClientError> {
        if let Some(dir) = self.path.parent() {
            fs::create_dir_all(dir)?;
        }
        fs::write(&self.path, format!("{}\n", nickname))?;
        tracing::debug!("Saved nickname to {}", self.path.display());
        Ok(())
    }
}
