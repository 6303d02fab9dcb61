use crate::storage::KeyValueStore;
use crate::types::ThemeMode;
use async_trait::async_trait;
use std::sync::Mutex;

pub struct ThemeDefinition {
    pub css: &'static str,
    pub toggle_icon: &'static str,
}

pub fn theme_definition(mode: ThemeMode) -> ThemeDefinition {
    match mode {
        ThemeMode::Dark => ThemeDefinition {
            css: DARK_THEME,
            toggle_icon: "sun",
        },
        ThemeMode::Light => ThemeDefinition {
            css: LIGHT_THEME,
            toggle_icon: "moon",
        },
    }
}

const DARK_THEME: &str = r#"
:root {
    --color-bg-primary: #0d0d0f;
    --color-bg-secondary: #18181b;
    --color-text-primary: #f4f4f5;
    --color-text-muted: #a1a1aa;
    --color-border: #3f3f46;
    --color-input-bg: #18181b;
    --color-chat-user-bg: #2563eb;
    --color-chat-user-text: #ffffff;
    --color-chat-bot-bg: #27272a;
    --color-chat-bot-text: #f4f4f5;
    --color-typing-dot: #a1a1aa;
    --color-timestamp: #71717a;
}
body { background: var(--color-bg-primary); color: var(--color-text-primary); }
.composer input { background: var(--color-input-bg); color: var(--color-text-primary); border-color: var(--color-border); }
"#;

const LIGHT_THEME: &str = r#"
:root {
    --color-bg-primary: #ffffff;
    --color-bg-secondary: #f4f4f5;
    --color-text-primary: #18181b;
    --color-text-muted: #52525b;
    --color-border: #d4d4d8;
    --color-input-bg: #ffffff;
    --color-chat-user-bg: #2563eb;
    --color-chat-user-text: #ffffff;
    --color-chat-bot-bg: #f4f4f5;
    --color-chat-bot-text: #18181b;
    --color-typing-dot: #71717a;
    --color-timestamp: #71717a;
}
body { background: var(--color-bg-primary); color: var(--color-text-primary); }
.composer input { background: var(--color-input-bg); color: var(--color-text-primary); border-color: var(--color-border); }
"#;

/// Where the active theme is shown: the document root's `data-theme`.
pub trait ThemeSurface {
    fn apply(&self, mode: ThemeMode);
    fn current(&self) -> Option<ThemeMode>;
}

/// The host's `prefers-color-scheme` media query.
#[async_trait(?Send)]
pub trait SchemeProbe {
    async fn prefers_dark(&self) -> bool;
}

pub struct ThemeController<S, D> {
    store: S,
    surface: D,
    key: String,
}

impl<S: KeyValueStore, D: ThemeSurface> ThemeController<S, D> {
    pub fn new(store: S, surface: D, key: impl Into<String>) -> Self {
        Self {
            store,
            surface,
            key: key.into(),
        }
    }

    pub fn surface(&self) -> &D {
        &self.surface
    }

    /// Show `mode` and remember it for the next start.
    pub async fn apply(&self, mode: ThemeMode) {
        self.surface.apply(mode);
        if let Err(err) = self.store.set(&self.key, mode.as_str()).await {
            tracing::warn!("failed to persist theme '{mode}': {err}");
        }
    }

    /// Restore the saved theme, falling back to the system preference.
    ///
    /// The probe is only consulted when nothing valid is stored. Without a
    /// saved choice or a dark preference the surface keeps its default.
    pub async fn init(&self, probe: &impl SchemeProbe) -> Option<ThemeMode> {
        if let Some(saved) = self.saved().await {
            self.apply(saved).await;
            return Some(saved);
        }

        if probe.prefers_dark().await {
            self.apply(ThemeMode::Dark).await;
            return Some(ThemeMode::Dark);
        }

        None
    }

    /// Flip the theme currently on the surface (not the stored one).
    pub async fn toggle(&self) -> ThemeMode {
        let next = if self.surface.current() == Some(ThemeMode::Dark) {
            ThemeMode::Light
        } else {
            ThemeMode::Dark
        };
        self.apply(next).await;
        next
    }

    async fn saved(&self) -> Option<ThemeMode> {
        let raw = self.store.get(&self.key).await?;
        match raw.parse() {
            Ok(mode) => Some(mode),
            Err(err) => {
                tracing::warn!("ignoring stored theme: {err}");
                None
            }
        }
    }
}

/// Surface that only remembers the applied mode.
#[derive(Debug, Default)]
pub struct DetachedSurface {
    mode: Mutex<Option<ThemeMode>>,
}

impl ThemeSurface for DetachedSurface {
    fn apply(&self, mode: ThemeMode) {
        if let Ok(mut current) = self.mode.lock() {
            *current = Some(mode);
        }
    }

    fn current(&self) -> Option<ThemeMode> {
        self.mode.lock().ok().and_then(|mode| *mode)
    }
}
