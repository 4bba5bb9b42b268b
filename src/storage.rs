//! Preference Storage Module
//!
//! Persists the auth token and language preference across restarts and
//! publishes both as observable values.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tokio::sync::{watch, Mutex};
use tracing::{debug, error, info, warn};

/// Language used when none has been saved.
pub const DEFAULT_LANGUAGE: &str = "az";

/// Languages the client ships translations for.
pub const SUPPORTED_LANGUAGES: [&str; 2] = ["az", "en"];

const PREFERENCES_FILE: &str = "preferences.json";

/// On-disk representation of the preferences file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct Preferences {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    language: Option<String>,
}

/// Source of the current auth token, readable without suspending.
pub trait TokenSource: Send + Sync {
    fn token(&self) -> Option<String>;
}

/// Durable per-install preference store
#[derive(Debug)]
pub struct PreferenceStore {
    file_path: PathBuf,
    token: watch::Sender<Option<String>>,
    language: watch::Sender<String>,
    write_lock: Mutex<()>,
}

impl PreferenceStore {
    /// Open the store rooted at `dir`, loading any previously saved values.
    pub fn open(dir: &Path) -> Result<Self, StorageError> {
        std::fs::create_dir_all(dir).map_err(|e| StorageError::Io(e.to_string()))?;

        let file_path = dir.join(PREFERENCES_FILE);
        let saved = load(&file_path);

        debug!("Preference storage initialized at: {:?}", file_path);

        let (token, _) = watch::channel(saved.token.filter(|t| !t.is_empty()));
        let (language, _) =
            watch::channel(saved.language.unwrap_or_else(|| DEFAULT_LANGUAGE.to_string()));

        Ok(Self {
            file_path,
            token,
            language,
            write_lock: Mutex::new(()),
        })
    }

    /// Current token, read synchronously.
    pub fn token_now(&self) -> Option<String> {
        self.token.borrow().clone()
    }

    /// Stream of token changes; the receiver starts at the current value.
    pub fn token_stream(&self) -> watch::Receiver<Option<String>> {
        self.token.subscribe()
    }

    /// Persist a new token.
    pub async fn save_token(&self, token: &str) -> Result<(), StorageError> {
        let _guard = self.write_lock.lock().await;
        let previous = self.token.send_replace(Some(token.to_string()));
        if let Err(e) = self.persist().await {
            self.token.send_replace(previous);
            return Err(e);
        }
        info!("Saved auth token ({} chars)", token.len());
        Ok(())
    }

    /// Remove the persisted token. The in-memory value is cleared even if the write fails.
    pub async fn clear_token(&self) -> Result<(), StorageError> {
        let _guard = self.write_lock.lock().await;
        self.token.send_replace(None);
        self.persist().await?;
        info!("Cleared auth token");
        Ok(())
    }

    /// Current language code, or [`DEFAULT_LANGUAGE`] when unset.
    pub fn language(&self) -> String {
        self.language.borrow().clone()
    }

    pub fn language_stream(&self) -> watch::Receiver<String> {
        self.language.subscribe()
    }

    /// Persist a language code.
    pub async fn save_language(&self, code: &str) -> Result<(), StorageError> {
        let _guard = self.write_lock.lock().await;
        let previous = self.language.send_replace(code.to_string());
        if let Err(e) = self.persist().await {
            self.language.send_replace(previous);
            return Err(e);
        }
        info!("Saved language: {}", code);
        Ok(())
    }

    async fn persist(&self) -> Result<(), StorageError> {
        let snapshot = Preferences {
            token: self.token.borrow().clone(),
            language: Some(self.language.borrow().clone()),
        };

        let json = serde_json::to_vec_pretty(&snapshot)
            .map_err(|e| StorageError::Serialization(e.to_string()))?;

        tokio::fs::write(&self.file_path, json).await.map_err(|e| {
            error!("Failed to write preferences: {}", e);
            StorageError::Io(e.to_string())
        })
    }
}

impl TokenSource for PreferenceStore {
    fn token(&self) -> Option<String> {
        self.token_now()
    }
}

fn load(file_path: &Path) -> Preferences {
    let bytes = match std::fs::read(file_path) {
        Ok(bytes) => bytes,
        Err(_) => {
            debug!("No stored preferences found");
            return Preferences::default();
        }
    };

    serde_json::from_slice(&bytes).unwrap_or_else(|e| {
        warn!("Discarding unreadable preferences file: {}", e);
        Preferences::default()
    })
}

/// Storage errors
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn defaults_when_nothing_saved() {
        let dir = tempfile::tempdir().unwrap();
        let store = PreferenceStore::open(dir.path()).unwrap();

        assert_eq!(store.token_now(), None);
        assert_eq!(store.language(), DEFAULT_LANGUAGE);
    }

    #[tokio::test]
    async fn token_survives_reopen_until_cleared() {
        let dir = tempfile::tempdir().unwrap();

        let store = PreferenceStore::open(dir.path()).unwrap();
        store.save_token("tok-1").await.unwrap();
        assert_eq!(store.token_now().as_deref(), Some("tok-1"));
        drop(store);

        let reopened = PreferenceStore::open(dir.path()).unwrap();
        assert_eq!(reopened.token_now().as_deref(), Some("tok-1"));

        reopened.clear_token().await.unwrap();
        drop(reopened);

        let cleared = PreferenceStore::open(dir.path()).unwrap();
        assert_eq!(cleared.token_now(), None);
    }

    #[tokio::test]
    async fn language_is_persisted_alongside_token() {
        let dir = tempfile::tempdir().unwrap();

        let store = PreferenceStore::open(dir.path()).unwrap();
        store.save_token("abc").await.unwrap();
        store.save_language("en").await.unwrap();
        drop(store);

        let reopened = PreferenceStore::open(dir.path()).unwrap();
        assert_eq!(reopened.language(), "en");
        assert_eq!(reopened.token_now().as_deref(), Some("abc"));
    }

    #[tokio::test]
    async fn streams_observe_writes() {
        let dir = tempfile::tempdir().unwrap();
        let store = PreferenceStore::open(dir.path()).unwrap();

        let mut tokens = store.token_stream();
        let mut languages = store.language_stream();

        store.save_token("t").await.unwrap();
        tokens.changed().await.unwrap();
        assert_eq!(tokens.borrow_and_update().as_deref(), Some("t"));

        store.save_language("en").await.unwrap();
        languages.changed().await.unwrap();
        assert_eq!(*languages.borrow_and_update(), "en");
    }

    #[test]
    fn corrupt_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(PREFERENCES_FILE), b"{not json").unwrap();

        let store = PreferenceStore::open(dir.path()).unwrap();
        assert_eq!(store.token_now(), None);
        assert_eq!(store.language(), DEFAULT_LANGUAGE);
    }
}
