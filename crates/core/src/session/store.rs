use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use tracing::{debug, warn};

use super::Session;

/// File-backed store for the token and role code.
///
/// Both values live in one JSON document so they are always written and
/// cleared together.
#[derive(Debug, Clone)]
pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    /// Store rooted at `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Location of the session file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the persisted session, returning `None` when nobody is signed in.
    ///
    /// A file that cannot be parsed is treated as signed out.
    pub fn load(&self) -> Result<Option<Session>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let contents = fs::read_to_string(&self.path)
            .with_context(|| format!("failed to read session {}", self.path.display()))?;
        match serde_json::from_str(&contents) {
            Ok(session) => Ok(Some(session)),
            Err(err) => {
                warn!(path = %self.path.display(), error = %err, "discarding unreadable session");
                Ok(None)
            }
        }
    }

    /// Persist `session`, creating parent directories if needed.
    pub fn persist(&self, session: &Session) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("failed to create session directory {}", parent.display())
            })?;
        }
        let serialized =
            serde_json::to_string_pretty(session).context("failed to serialize session")?;
        fs::write(&self.path, serialized)
            .with_context(|| format!("failed to write session {}", self.path.display()))?;
        debug!(path = %self.path.display(), role = %session.role(), "session stored");
        Ok(())
    }

    /// Remove the persisted session. Clearing an absent session is not an error.
    pub fn clear(&self) -> Result<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err)
                .with_context(|| format!("failed to remove session {}", self.path.display())),
        }
    }
}
