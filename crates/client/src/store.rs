//! On-disk session storage.
//!
//! The session file plays the part a browser tab plays for the web dashboard: it holds the
//! tokens from the last login until logout or expiry.

use crate::{ClientError, ClientResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Tokens persisted after a successful login.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredSession {
    pub id_token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    pub saved_at: DateTime<Utc>,
}

#[derive(Clone, Debug)]
pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn load(&self) -> ClientResult<StoredSession> {
        let contents = std::fs::read_to_string(&self.path).map_err(ClientError::SessionRead)?;
        serde_json::from_str(&contents).map_err(ClientError::SessionFormat)
    }

    /// Write the session, creating the parent directory if needed.
    ///
    /// On Unix the file is created readable by the owner only.
    pub fn save(&self, session: &StoredSession) -> ClientResult<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(ClientError::SessionWrite)?;
            }
        }

        let json = serde_json::to_string_pretty(session).map_err(ClientError::SessionFormat)?;
        write_private(&self.path, json.as_bytes()).map_err(ClientError::SessionWrite)?;
        tracing::debug!("saved session to {}", self.path.display());
        Ok(())
    }

    /// Remove the session file. Returns `false` if there was nothing to remove.
    pub fn clear(&self) -> ClientResult<bool> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(ClientError::SessionWrite(e)),
        }
    }
}

#[cfg(unix)]
fn write_private(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    use std::io::Write;
    use std::os::unix::fs::OpenOptionsExt;

    let mut file = std::fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .mode(0o600)
        .open(path)?;
    file.write_all(bytes)
}

#[cfg(not(unix))]
fn write_private(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    std::fs::write(path, bytes)
}
