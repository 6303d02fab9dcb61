//! Key-value persistence for widget preferences.
//!
//! This module provides:
//! - File-backed storage on native platforms (one file per key)
//! - In-memory storage for tests and hosts without persistence
//!
//! The web build stores through `localStorage` instead (see `platform`).

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;

#[cfg(not(target_arch = "wasm32"))]
use std::{fs, io, path::PathBuf};

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[cfg(not(target_arch = "wasm32"))]
    #[error("storage io error: {0}")]
    Io(#[from] io::Error),
    #[error("storage bridge error: {0}")]
    Bridge(String),
}

#[async_trait(?Send)]
pub trait KeyValueStore {
    async fn get(&self, key: &str) -> Option<String>;
    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
}

// ============================================
// File Storage (native platforms)
// ============================================

#[cfg(not(target_arch = "wasm32"))]
#[derive(Clone, Debug)]
pub struct FileStore {
    dir: PathBuf,
}

#[cfg(not(target_arch = "wasm32"))]
impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Store under the platform data directory, e.g.
    /// `~/.local/share/<app_dir>/prefs` on Linux.
    pub fn in_data_dir(app_dir: &str) -> Self {
        let app_dir = sanitize_key(app_dir);
        if let Some(data_dir) = dirs::data_local_dir() {
            return Self::new(data_dir.join(app_dir).join("prefs"));
        }

        Self::new(PathBuf::from("cache").join(app_dir).join("prefs"))
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", sanitize_key(key)))
    }
}

#[cfg(not(target_arch = "wasm32"))]
#[async_trait(?Send)]
impl KeyValueStore for FileStore {
    async fn get(&self, key: &str) -> Option<String> {
        let path = self.path_for(key);
        match fs::read_to_string(&path) {
            Ok(value) => Some(value),
            Err(err) if err.kind() == io::ErrorKind::NotFound => None,
            Err(err) => {
                tracing::warn!(path = %path.display(), "failed to read preference: {err}");
                None
            }
        }
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        fs::create_dir_all(&self.dir)?;
        fs::write(self.path_for(key), value)?;
        Ok(())
    }
}

// ============================================
// In-memory Storage
// ============================================

#[derive(Debug, Default)]
pub struct MemoryStore {
    values: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait(?Send)]
impl KeyValueStore for MemoryStore {
    async fn get(&self, key: &str) -> Option<String> {
        self.values.lock().ok()?.get(key).cloned()
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut values = self
            .values
            .lock()
            .map_err(|e| StorageError::Bridge(e.to_string()))?;
        values.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Sanitize storage key for filesystem use
fn sanitize_key(key: &str) -> String {
    key.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .take(64)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_key() {
        assert_eq!(sanitize_key("theme"), "theme");
        assert_eq!(sanitize_key("user:preferences"), "user_preferences");
        assert_eq!(sanitize_key("../escape"), "___escape");
        assert_eq!(sanitize_key(&"k".repeat(100)).len(), 64);
    }

    #[tokio::test]
    async fn test_memory_store_round_trip() {
        let store = MemoryStore::new();
        assert_eq!(store.get("theme").await, None);
        store.set("theme", "dark").await.unwrap();
        store.set("theme", "light").await.unwrap();
        assert_eq!(store.get("theme").await, Some("light".to_string()));
    }
}
