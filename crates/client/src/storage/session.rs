//! Persistent session storage.
//!
//! This module provides a thread-safe store for the bearer token issued on
//! login. The token persists to a JSON session file under the client data
//! directory, keyed by the fixed [`TOKEN_KEY`] entry so the file mirrors
//! the keyed storage the credential lived in historically.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use anyhow::{Context, Result};
use api::token::TOKEN_KEY;

/// Thread-safe persistent store for the login session token.
#[derive(Debug)]
pub struct TokenStore {
    /// Path of the backing session file.
    path: PathBuf,
    /// Cached token, `None` when logged out.
    token: RwLock<Option<String>>,
}

impl TokenStore {
    /// Creates a store backed by the given session file.
    ///
    /// The file is not touched until [`load`](Self::load) or a mutation.
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            token: RwLock::new(None),
        }
    }

    /// Loads the session file into memory.
    ///
    /// A missing file is not an error; it simply means no one is logged in.
    pub fn load(&self) -> Result<()> {
        if !self.path.exists() {
            tracing::debug!("Session file not found at {:?}", self.path);
            return Ok(());
        }

        let contents = fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read session file: {}", self.path.display()))?;
        let entries: HashMap<String, String> = serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse session file: {}", self.path.display()))?;

        let mut token = self.lock_write()?;
        *token = entries.get(TOKEN_KEY).cloned();
        Ok(())
    }

    /// Returns the stored token, if any.
    pub fn token(&self) -> Option<String> {
        self.token.read().ok().and_then(|t| t.clone())
    }

    /// Returns whether a token is currently stored.
    pub fn is_authenticated(&self) -> bool {
        self.token().is_some()
    }

    /// Stores a new token and persists it.
    pub fn set_token(&self, value: String) -> Result<()> {
        {
            let mut token = self.lock_write()?;
            *token = Some(value);
        }
        self.save()
    }

    /// Removes the token and persists the empty session.
    pub fn clear(&self) -> Result<()> {
        {
            let mut token = self.lock_write()?;
            *token = None;
        }
        self.save()
    }

    /// Writes the current session to disk.
    ///
    /// Creates parent directories if they don't exist.
    pub fn save(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create session directory: {}", parent.display())
            })?;
        }

        let mut entries = HashMap::new();
        if let Some(token) = self.token() {
            entries.insert(TOKEN_KEY.to_string(), token);
        }

        let contents =
            serde_json::to_string_pretty(&entries).context("Failed to serialize session")?;
        fs::write(&self.path, contents)
            .with_context(|| format!("Failed to write session file: {}", self.path.display()))?;

        Ok(())
    }

    fn lock_write(&self) -> Result<std::sync::RwLockWriteGuard<'_, Option<String>>> {
        self.token
            .write()
            .map_err(|_| anyhow::anyhow!("session lock poisoned"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn empty_store_is_logged_out() {
        let temp_dir = TempDir::new().unwrap();
        let store = TokenStore::new(temp_dir.path().join("session.json"));

        store.load().unwrap();

        assert!(!store.is_authenticated());
        assert_eq!(store.token(), None);
    }

    #[test]
    fn token_persists_across_reopen() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("session.json");

        let store = TokenStore::new(&path);
        store.set_token("header.payload.sig".to_string()).unwrap();

        let reopened = TokenStore::new(&path);
        reopened.load().unwrap();

        assert_eq!(reopened.token(), Some("header.payload.sig".to_string()));
        assert!(reopened.is_authenticated());
    }

    #[test]
    fn session_file_uses_fixed_key() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("session.json");

        let store = TokenStore::new(&path);
        store.set_token("tok".to_string()).unwrap();

        let raw = fs::read_to_string(&path).unwrap();
        let entries: HashMap<String, String> = serde_json::from_str(&raw).unwrap();
        assert_eq!(entries.get(TOKEN_KEY), Some(&"tok".to_string()));
    }

    #[test]
    fn clear_removes_token_from_disk() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("session.json");

        let store = TokenStore::new(&path);
        store.set_token("tok".to_string()).unwrap();
        store.clear().unwrap();

        assert!(!store.is_authenticated());

        let reopened = TokenStore::new(&path);
        reopened.load().unwrap();
        assert_eq!(reopened.token(), None);
    }

    #[test]
    fn set_token_creates_parent_directories() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("deep").join("nested").join("session.json");

        let store = TokenStore::new(&path);
        store.set_token("tok".to_string()).unwrap();

        assert!(path.exists());
    }

    #[test]
    fn corrupted_session_file_is_an_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("session.json");
        fs::write(&path, "not json").unwrap();

        let store = TokenStore::new(&path);
        let err = store.load().unwrap_err().to_string();
        assert!(err.contains("Failed to parse session file"));
    }
}
