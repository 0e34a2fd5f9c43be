//! Durable storage for the signed-in identity.
//!
//! Only `user`, `token` and `isAuthenticated` cross this boundary. Loading
//! and error flags and the league cache are never written.

use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::{
    models::User,
    session::{Session, SessionPhase},
};

/// File name of the persisted record inside the storage directory.
pub const STORAGE_KEY: &str = "auth-storage.json";

/// The persisted subset of [`Session`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct PersistedSession {
    /// Signed-in account.
    #[serde(default)]
    pub user: Option<User>,
    /// Bearer token.
    #[serde(default)]
    pub token: Option<String>,
    /// Whether the record represents a live login.
    #[serde(default)]
    pub is_authenticated: bool,
}

impl PersistedSession {
    /// Project a full session onto its persisted subset.
    pub fn capture(session: &Session) -> Self {
        Self {
            user: session.user.clone(),
            token: session.token.clone(),
            is_authenticated: session.is_authenticated,
        }
    }

    /// Rebuild a session from a stored record.
    ///
    /// A record claiming to be authenticated without both user and token is
    /// treated as anonymous.
    pub fn into_session(self) -> Session {
        match (self.user, self.token, self.is_authenticated) {
            (Some(user), Some(token), true) => Session {
                user: Some(user),
                token: Some(token),
                is_authenticated: true,
                phase: SessionPhase::Authenticated,
                ..Session::default()
            },
            (user, token, false) => Session {
                user,
                token,
                ..Session::default()
            },
            _ => Session::default(),
        }
    }
}

/// Reads and writes [`PersistedSession`] as JSON on disk.
#[derive(Debug, Clone)]
pub struct SessionStorage {
    path: PathBuf,
}

impl SessionStorage {
    /// Storage rooted at `dir`, using [`STORAGE_KEY`] as the file name.
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self {
            path: dir.as_ref().join(STORAGE_KEY),
        }
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the stored record, returning `None` if nothing was saved yet.
    pub fn load(&self) -> Result<Option<PersistedSession>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let contents = fs::read_to_string(&self.path)
            .with_context(|| format!("failed to read {}", self.path.display()))?;
        let record = serde_json::from_str(&contents)
            .with_context(|| format!("failed to parse {}", self.path.display()))?;
        Ok(Some(record))
    }

    /// Load and rebuild a session, falling back to anonymous on any failure.
    pub fn restore(&self) -> Session {
        match self.load() {
            Ok(Some(record)) => record.into_session(),
            Ok(None) => Session::default(),
            Err(err) => {
                warn!(?err, "Discarding unreadable persisted session");
                Session::default()
            }
        }
    }

    /// Write the record, creating the directory if needed.
    pub fn persist(&self, record: &PersistedSession) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
        let serialized =
            serde_json::to_string_pretty(record).context("failed to serialize session")?;
        fs::write(&self.path, serialized)
            .with_context(|| format!("failed to write {}", self.path.display()))
    }
}
