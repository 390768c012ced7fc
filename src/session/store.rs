// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Local persistence for the session token.
//!
//! A store holds at most one token. It is replaced whole or cleared, never
//! edited in place.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use super::SessionError;

/// File name used by [`FileTokenStore::in_dir`].
pub const TOKEN_FILE_NAME: &str = "session.token";

/// Durable holder of the current session token.
pub trait TokenStore: Send + Sync {
    /// Current token, if any. Empty content counts as no token.
    fn load(&self) -> Result<Option<String>, SessionError>;

    /// Replace whatever is stored with `token`.
    fn save(&self, token: &str) -> Result<(), SessionError>;

    /// Remove the stored token. Clearing an empty store succeeds.
    fn clear(&self) -> Result<(), SessionError>;
}

/// Token kept in a single file on disk.
#[derive(Debug, Clone)]
pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Store the token as `session.token` inside `dir`.
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        Self::new(dir.as_ref().join(TOKEN_FILE_NAME))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self.path.file_name().unwrap_or_default().to_os_string();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl TokenStore for FileTokenStore {
    fn load(&self) -> Result<Option<String>, SessionError> {
        match fs::read_to_string(&self.path) {
            Ok(content) => {
                let token = content.trim();
                Ok((!token.is_empty()).then(|| token.to_string()))
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn save(&self, token: &str) -> Result<(), SessionError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        // Write-then-rename so a reader never sees a half-written token.
        let temp = self.temp_path();
        fs::write(&temp, token.as_bytes())?;
        fs::rename(&temp, &self.path)?;
        Ok(())
    }

    fn clear(&self) -> Result<(), SessionError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// Token kept in process memory.
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    token: Mutex<Option<String>>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl TokenStore for MemoryTokenStore {
    fn load(&self) -> Result<Option<String>, SessionError> {
        let token = self.token.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(token.clone().filter(|t| !t.is_empty()))
    }

    fn save(&self, token: &str) -> Result<(), SessionError> {
        *self.token.lock().unwrap_or_else(PoisonError::into_inner) = Some(token.to_string());
        Ok(())
    }

    fn clear(&self) -> Result<(), SessionError> {
        *self.token.lock().unwrap_or_else(PoisonError::into_inner) = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn file_store_round_trip() {
        let dir = TempDir::new().unwrap();
        let store = FileTokenStore::in_dir(dir.path());

        assert_eq!(store.load().unwrap(), None);
        store.save("token-a").unwrap();
        assert_eq!(store.load().unwrap().as_deref(), Some("token-a"));

        store.save("token-b").unwrap();
        assert_eq!(store.load().unwrap().as_deref(), Some("token-b"));
        assert!(!store.temp_path().exists());

        store.clear().unwrap();
        assert_eq!(store.load().unwrap(), None);
        assert!(!store.path().exists());
    }

    #[test]
    fn file_store_creates_missing_directories() {
        let dir = TempDir::new().unwrap();
        let store = FileTokenStore::in_dir(dir.path().join("nested").join("app"));
        store.save("token").unwrap();
        assert_eq!(store.load().unwrap().as_deref(), Some("token"));
    }

    #[test]
    fn file_store_clear_is_idempotent() {
        let dir = TempDir::new().unwrap();
        let store = FileTokenStore::in_dir(dir.path());
        store.clear().unwrap();
        store.clear().unwrap();
    }

    #[test]
    fn empty_file_is_no_session() {
        let dir = TempDir::new().unwrap();
        let store = FileTokenStore::in_dir(dir.path());
        fs::write(store.path(), "  \n").unwrap();
        assert_eq!(store.load().unwrap(), None);
    }

    #[test]
    fn file_store_survives_reopen() {
        let dir = TempDir::new().unwrap();
        FileTokenStore::in_dir(dir.path()).save("persisted").unwrap();

        let reopened = FileTokenStore::in_dir(dir.path());
        assert_eq!(reopened.load().unwrap().as_deref(), Some("persisted"));
    }

    #[test]
    fn memory_store_replace_and_clear() {
        let store = MemoryTokenStore::new();
        assert_eq!(store.load().unwrap(), None);
        store.save("a").unwrap();
        store.save("b").unwrap();
        assert_eq!(store.load().unwrap().as_deref(), Some("b"));
        store.clear().unwrap();
        assert_eq!(store.load().unwrap(), None);

        store.save("").unwrap();
        assert_eq!(store.load().unwrap(), None);
    }
}
