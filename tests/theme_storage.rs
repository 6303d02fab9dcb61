//! Integration tests for persisted theme preferences
//!
//! Tests file-backed storage and theme restore across restarts.

use async_trait::async_trait;
use parley::config::THEME_STORAGE_KEY;
use parley::storage::{FileStore, KeyValueStore};
use parley::theme::{DetachedSurface, SchemeProbe, ThemeController, ThemeSurface};
use parley::types::ThemeMode;
use std::sync::atomic::{AtomicBool, Ordering};

/// Probe that records whether it was asked.
#[derive(Default)]
struct WatchedProbe {
    asked: AtomicBool,
}

#[async_trait(?Send)]
impl SchemeProbe for WatchedProbe {
    async fn prefers_dark(&self) -> bool {
        self.asked.store(true, Ordering::SeqCst);
        false
    }
}

mod file_store_tests {
    use super::*;

    #[tokio::test]
    async fn test_set_and_get() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path().join("prefs"));

        assert_eq!(store.get("theme").await, None);
        store.set("theme", "dark").await.expect("Failed to set");
        assert_eq!(store.get("theme").await, Some("dark".to_string()));
        assert!(dir.path().join("prefs").join("theme.json").exists());
    }

    #[tokio::test]
    async fn test_special_characters_in_key() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path());

        store.set("user:theme", "light").await.expect("Failed to set");
        assert_eq!(store.get("user:theme").await, Some("light".to_string()));
        assert!(dir.path().join("user_theme.json").exists());
    }

    #[tokio::test]
    async fn test_set_fails_when_dir_is_a_file() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("prefs");
        std::fs::write(&blocker, "not a directory").unwrap();

        let store = FileStore::new(&blocker);
        assert!(store.set("theme", "dark").await.is_err());
    }

    #[tokio::test]
    async fn test_unreadable_entry_reads_as_missing() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("theme.json")).unwrap();

        let store = FileStore::new(dir.path());
        assert_eq!(store.get("theme").await, None);
    }
}

mod restore_tests {
    use super::*;

    #[tokio::test]
    async fn test_dark_survives_restart_without_probe() {
        let dir = tempfile::tempdir().unwrap();

        let first = ThemeController::new(
            FileStore::new(dir.path()),
            DetachedSurface::default(),
            THEME_STORAGE_KEY,
        );
        first.apply(ThemeMode::Dark).await;

        let restarted = ThemeController::new(
            FileStore::new(dir.path()),
            DetachedSurface::default(),
            THEME_STORAGE_KEY,
        );
        let probe = WatchedProbe::default();

        assert_eq!(restarted.init(&probe).await, Some(ThemeMode::Dark));
        assert_eq!(restarted.surface().current(), Some(ThemeMode::Dark));
        assert!(!probe.asked.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_toggle_persists_each_flip() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path());
        let themes = ThemeController::new(store.clone(), DetachedSurface::default(), "theme");

        themes.toggle().await;
        assert_eq!(store.get("theme").await.as_deref(), Some("dark"));
        themes.toggle().await;
        assert_eq!(store.get("theme").await.as_deref(), Some("light"));
    }

    #[tokio::test]
    async fn test_theme_still_applies_when_storage_fails() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("prefs");
        std::fs::write(&blocker, "x").unwrap();

        let themes =
            ThemeController::new(FileStore::new(&blocker), DetachedSurface::default(), "theme");
        themes.apply(ThemeMode::Dark).await;
        assert_eq!(themes.surface().current(), Some(ThemeMode::Dark));
    }
}
