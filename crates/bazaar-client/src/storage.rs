//! Persisted session storage.
//!
//! # Design
//! - The store holds only the bearer token and the user id; everything else is
//!   re-fetched from the API.
//! - Placeholder strings left behind by older clients (`"undefined"`,
//!   `"null"`) read as absent.

use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use serde::{Deserialize, Serialize};

use crate::error::ApiError;

/// Persisted session fields.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct StoredSession {
    /// Bearer token.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    /// Identifier of the signed-in user.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
}

impl StoredSession {
    /// Session for a freshly authenticated user.
    #[must_use]
    pub fn new(token: impl Into<String>, user_id: Option<String>) -> Self {
        Self {
            token: Some(token.into()),
            user_id,
        }
    }

    /// Usable token, ignoring blanks and placeholders.
    #[must_use]
    pub fn token(&self) -> Option<&str> {
        usable(self.token.as_deref())
    }

    /// Usable user id, ignoring blanks and placeholders.
    #[must_use]
    pub fn user_id(&self) -> Option<&str> {
        usable(self.user_id.as_deref())
    }
}

fn usable(value: Option<&str>) -> Option<&str> {
    value
        .map(str::trim)
        .filter(|value| !value.is_empty() && *value != "undefined" && *value != "null")
}

/// Backing store for the persisted session.
pub trait SessionStore: Send + Sync + fmt::Debug {
    /// Read the current session; a missing session reads as empty.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Storage`] when the backing medium is unreadable.
    fn load(&self) -> Result<StoredSession, ApiError>;

    /// Replace the persisted session.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Storage`] when the session cannot be written.
    fn save(&self, session: &StoredSession) -> Result<(), ApiError>;

    /// Remove the persisted session.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Storage`] when the session cannot be removed.
    fn clear(&self) -> Result<(), ApiError>;

    /// Usable bearer token, if any. Read failures count as signed out.
    fn token(&self) -> Option<String> {
        match self.load() {
            Ok(session) => session.token().map(str::to_string),
            Err(err) => {
                tracing::warn!(error = %err, "failed to read session; treating as signed out");
                None
            }
        }
    }

    /// Usable user id, if any.
    fn user_id(&self) -> Option<String> {
        self.load()
            .ok()
            .and_then(|session| session.user_id().map(str::to_string))
    }
}

/// In-process store, lost when the process exits.
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    session: Mutex<StoredSession>,
}

impl MemorySessionStore {
    /// Empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-seeded with `session`.
    #[must_use]
    pub fn with_session(session: StoredSession) -> Self {
        Self {
            session: Mutex::new(session),
        }
    }
}

impl SessionStore for MemorySessionStore {
    fn load(&self) -> Result<StoredSession, ApiError> {
        Ok(self
            .session
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone())
    }

    fn save(&self, session: &StoredSession) -> Result<(), ApiError> {
        *self.session.lock().unwrap_or_else(PoisonError::into_inner) = session.clone();
        Ok(())
    }

    fn clear(&self) -> Result<(), ApiError> {
        *self.session.lock().unwrap_or_else(PoisonError::into_inner) = StoredSession::default();
        Ok(())
    }
}

/// JSON file store (`{ "token": ..., "userId": ... }`).
#[derive(Debug, Clone)]
pub struct FileSessionStore {
    path: PathBuf,
}

impl FileSessionStore {
    /// Store backed by `path`; the file is created on first save.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Location of the session file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SessionStore for FileSessionStore {
    fn load(&self) -> Result<StoredSession, ApiError> {
        match fs::read(&self.path) {
            Ok(bytes) if bytes.iter().all(u8::is_ascii_whitespace) => Ok(StoredSession::default()),
            Ok(bytes) => serde_json::from_slice(&bytes)
                .map_err(|err| ApiError::Storage(io::Error::new(io::ErrorKind::InvalidData, err))),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(StoredSession::default()),
            Err(err) => Err(ApiError::Storage(err)),
        }
    }

    fn save(&self, session: &StoredSession) -> Result<(), ApiError> {
        if let Some(parent) = self.path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(ApiError::Storage)?;
        }
        let bytes = serde_json::to_vec_pretty(session)
            .map_err(|err| ApiError::Storage(io::Error::new(io::ErrorKind::InvalidData, err)))?;
        fs::write(&self.path, bytes).map_err(ApiError::Storage)
    }

    fn clear(&self) -> Result<(), ApiError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(ApiError::Storage(err)),
        }
    }
}
