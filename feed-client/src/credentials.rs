//! Bearer token persistence.
//!
//! The session layer treats storage as opaque: one optional token under a
//! fixed key. [`MemoryCredentialStore`] is for tests and short-lived
//! sessions; [`FileCredentialStore`] keeps the token in a JSON file readable
//! only by the owner.

use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

use photofeed_types::AccessToken;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Key the token is stored under.
pub const TOKEN_KEY: &str = "BearerToken";

/// Credential store errors.
#[derive(Debug, Error)]
pub enum CredentialError {
    /// Reading or writing the backing file failed.
    #[error("credential file {path}: {source}")]
    Io {
        /// File involved.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The token could not be serialized.
    #[error("failed to encode credentials: {0}")]
    Encode(#[from] serde_json::Error),

    /// The store refused the write.
    #[error("credential store unavailable: {0}")]
    Unavailable(String),
}

/// Persistent slot for the bearer token.
pub trait CredentialStore: Send + Sync {
    /// The stored token, if any.
    ///
    /// An unreadable store reads as empty.
    fn token(&self) -> Option<AccessToken>;

    /// Replace the stored token.
    fn set_token(&self, token: &AccessToken) -> Result<(), CredentialError>;

    /// Remove the stored token. Clearing an empty store succeeds.
    fn clear(&self) -> Result<(), CredentialError>;
}

/// In-memory store.
///
/// Counts writes and can be told to fail the next one, which tests use to
/// check persistence behavior.
#[derive(Debug, Default)]
pub struct MemoryCredentialStore {
    inner: Mutex<MemoryInner>,
}

#[derive(Debug, Default)]
struct MemoryInner {
    token: Option<AccessToken>,
    writes: usize,
    fail_next_write: Option<String>,
}

impl MemoryCredentialStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store already holding `token`.
    pub fn with_token(token: AccessToken) -> Self {
        let store = Self::new();
        store.lock().token = Some(token);
        store
    }

    fn lock(&self) -> MutexGuard<'_, MemoryInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Number of successful `set_token` calls.
    pub fn write_count(&self) -> usize {
        self.lock().writes
    }

    /// Cause the next `set_token` to fail with the given reason.
    pub fn fail_next_write(&self, reason: &str) {
        self.lock().fail_next_write = Some(reason.to_string());
    }
}

impl CredentialStore for MemoryCredentialStore {
    fn token(&self) -> Option<AccessToken> {
        self.lock().token.clone()
    }

    fn set_token(&self, token: &AccessToken) -> Result<(), CredentialError> {
        let mut inner = self.lock();
        if let Some(reason) = inner.fail_next_write.take() {
            return Err(CredentialError::Unavailable(reason));
        }
        inner.token = Some(token.clone());
        inner.writes += 1;
        Ok(())
    }

    fn clear(&self) -> Result<(), CredentialError> {
        self.lock().token = None;
        Ok(())
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct StoredCredentials {
    #[serde(rename = "BearerToken", default, skip_serializing_if = "Option::is_none")]
    bearer_token: Option<AccessToken>,
}

/// Store backed by a JSON file.
#[derive(Debug, Clone)]
pub struct FileCredentialStore {
    path: PathBuf,
}

impl FileCredentialStore {
    /// Use the file at `path`. Nothing is touched until the first write.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, source: std::io::Error) -> CredentialError {
        CredentialError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

impl CredentialStore for FileCredentialStore {
    fn token(&self) -> Option<AccessToken> {
        let contents = match std::fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return None,
            Err(e) => {
                tracing::warn!("Cannot read credentials at {}: {}", self.path.display(), e);
                return None;
            }
        };
        match serde_json::from_str::<StoredCredentials>(&contents) {
            Ok(stored) => stored.bearer_token,
            Err(e) => {
                tracing::warn!("Ignoring corrupt credentials at {}: {}", self.path.display(), e);
                None
            }
        }
    }

    fn set_token(&self, token: &AccessToken) -> Result<(), CredentialError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| self.io_error(e))?;
        }
        let stored = StoredCredentials {
            bearer_token: Some(token.clone()),
        };
        let contents = serde_json::to_string_pretty(&stored)?;
        std::fs::write(&self.path, contents).map_err(|e| self.io_error(e))?;
        set_file_permissions_0600(&self.path).map_err(|e| self.io_error(e))?;
        Ok(())
    }

    fn clear(&self) -> Result<(), CredentialError> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(self.io_error(e)),
        }
    }
}

/// Set file permissions to 0600 (owner read/write only) on Unix.
/// No-op on non-Unix platforms.
fn set_file_permissions_0600(path: &Path) -> std::io::Result<()> {
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))?;
    }
    #[cfg(not(unix))]
    {
        let _ = path;
    }
    Ok(())
}
