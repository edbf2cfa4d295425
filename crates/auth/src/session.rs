//! Local session cache.
//!
//! Holds the process's single active token between command invocations. The
//! store is an explicit, injectable abstraction so tests substitute the
//! in-memory implementation for the file-backed one.

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::token::Token;

/// Session cache failure. The cache is local state; callers treat failures as
/// "not logged in" or surface them, they never corrupt business records.
#[derive(Debug, Error)]
pub enum SessionStoreError {
    #[error("session cache io: {0}")]
    Io(#[from] std::io::Error),

    #[error("session cache record: {0}")]
    Record(#[from] serde_json::Error),
}

/// Single-slot token cache.
///
/// `save` overwrites on each login; `clear` is unconditional.
pub trait SessionStore: Send + Sync {
    fn load(&self) -> Result<Option<Token>, SessionStoreError>;
    fn save(&self, token: &Token) -> Result<(), SessionStoreError>;
    fn clear(&self) -> Result<(), SessionStoreError>;
}

/// On-disk record wrapping the cached token.
#[derive(Debug, Serialize, Deserialize)]
struct SessionRecord {
    token: Token,
    created_at: DateTime<Utc>,
}

/// File-backed session cache: one JSON record, owner-only permissions on Unix.
#[derive(Debug, Clone)]
pub struct FileSessionStore {
    path: PathBuf,
}

impl FileSessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Default cache location: `$HOME/.banquet_session`, falling back to the
    /// working directory when `HOME` is unset.
    pub fn default_path() -> PathBuf {
        std::env::var_os("HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".banquet_session")
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SessionStore for FileSessionStore {
    fn load(&self) -> Result<Option<Token>, SessionStoreError> {
        let raw = match std::fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        match serde_json::from_str::<SessionRecord>(&raw) {
            Ok(record) => Ok(Some(record.token)),
            Err(e) => {
                // A mangled cache means "not logged in", not a hard failure.
                tracing::warn!(path = %self.path.display(), error = %e, "discarding malformed session record");
                Ok(None)
            }
        }
    }

    fn save(&self, token: &Token) -> Result<(), SessionStoreError> {
        let record = SessionRecord {
            token: token.clone(),
            created_at: Utc::now(),
        };
        std::fs::write(&self.path, serde_json::to_vec(&record)?)?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(&self.path, std::fs::Permissions::from_mode(0o600))?;
        }

        Ok(())
    }

    fn clear(&self) -> Result<(), SessionStoreError> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// In-memory session cache for tests.
#[derive(Debug, Default)]
pub struct InMemorySessionStore {
    slot: Mutex<Option<Token>>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn slot(&self) -> std::sync::MutexGuard<'_, Option<Token>> {
        self.slot.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl SessionStore for InMemorySessionStore {
    fn load(&self) -> Result<Option<Token>, SessionStoreError> {
        Ok(self.slot().clone())
    }

    fn save(&self, token: &Token) -> Result<(), SessionStoreError> {
        *self.slot() = Some(token.clone());
        Ok(())
    }

    fn clear(&self) -> Result<(), SessionStoreError> {
        *self.slot() = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_store() -> FileSessionStore {
        let path = std::env::temp_dir().join(format!(
            "banquet-session-test-{}",
            uuid::Uuid::now_v7()
        ));
        FileSessionStore::new(path)
    }

    #[test]
    fn file_store_round_trips_token() {
        let store = temp_store();
        let token = Token::from_raw("header.payload.signature");

        store.save(&token).unwrap();
        assert_eq!(store.load().unwrap(), Some(token));

        store.clear().unwrap();
        assert_eq!(store.load().unwrap(), None);
    }

    #[test]
    fn file_store_overwrites_on_save() {
        let store = temp_store();
        store.save(&Token::from_raw("first")).unwrap();
        store.save(&Token::from_raw("second")).unwrap();

        assert_eq!(store.load().unwrap(), Some(Token::from_raw("second")));
        store.clear().unwrap();
    }

    #[test]
    fn missing_file_reads_as_logged_out() {
        let store = temp_store();
        assert_eq!(store.load().unwrap(), None);
    }

    #[test]
    fn malformed_record_reads_as_logged_out() {
        let store = temp_store();
        std::fs::write(store.path(), b"{ not json").unwrap();
        assert_eq!(store.load().unwrap(), None);
        store.clear().unwrap();
    }

    #[test]
    fn clear_is_idempotent() {
        let store = temp_store();
        store.clear().unwrap();
        store.clear().unwrap();
    }

    #[cfg(unix)]
    #[test]
    fn file_store_restricts_permissions() {
        use std::os::unix::fs::PermissionsExt;

        let store = temp_store();
        store.save(&Token::from_raw("secret")).unwrap();

        let mode = std::fs::metadata(store.path()).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
        store.clear().unwrap();
    }

    #[test]
    fn in_memory_store_round_trips() {
        let store = InMemorySessionStore::new();
        assert_eq!(store.load().unwrap(), None);

        store.save(&Token::from_raw("tok")).unwrap();
        assert_eq!(store.load().unwrap(), Some(Token::from_raw("tok")));

        store.clear().unwrap();
        assert_eq!(store.load().unwrap(), None);
    }
}
