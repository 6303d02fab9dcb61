use reqwest::Url;
use std::env;
use std::time::Duration;

/// Bundled config for mobile and web builds
const BUNDLED_CONFIG: &str = include_str!("../assets/config.env");

pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:5000";
pub const DEFAULT_SPEECH_LANG: &str = "en-US";
pub const DEFAULT_APP_DIR: &str = "parley";
pub const THEME_STORAGE_KEY: &str = "theme";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid PARLEY_BASE_URL '{value}': {reason}")]
    InvalidUrl { value: String, reason: String },
    #[error("invalid PARLEY_TIMEOUT_SECS '{0}': expected a positive whole number")]
    InvalidTimeout(String),
}

#[derive(Clone, Debug, PartialEq)]
pub struct WidgetConfig {
    pub base_url: Url,
    pub timeout: Option<Duration>,
    pub speech_lang: String,
    pub voice: Option<String>,
    pub app_dir: String,
}

impl Default for WidgetConfig {
    fn default() -> Self {
        Self {
            base_url: Url::parse(DEFAULT_BASE_URL).expect("default base url is valid"),
            timeout: None,
            speech_lang: DEFAULT_SPEECH_LANG.to_string(),
            voice: None,
            app_dir: DEFAULT_APP_DIR.to_string(),
        }
    }
}

impl WidgetConfig {
    /// Read configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable source.
    ///
    /// Blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };
        let mut config = Self::default();

        if let Some(raw) = get("PARLEY_BASE_URL") {
            config.base_url = Url::parse(&raw).map_err(|err| ConfigError::InvalidUrl {
                value: raw.clone(),
                reason: err.to_string(),
            })?;
        }

        if let Some(raw) = get("PARLEY_TIMEOUT_SECS") {
            let secs = raw
                .parse::<u64>()
                .ok()
                .filter(|secs| *secs > 0)
                .ok_or_else(|| ConfigError::InvalidTimeout(raw.clone()))?;
            config.timeout = Some(Duration::from_secs(secs));
        }

        if let Some(lang) = get("PARLEY_SPEECH_LANG") {
            config.speech_lang = lang;
        }
        config.voice = get("PARLEY_VOICE");
        if let Some(dir) = get("PARLEY_APP_DIR") {
            config.app_dir = dir;
        }

        Ok(config)
    }
}

/// Seed the environment from `.env` (desktop dev) or the bundled config.
#[cfg(not(target_arch = "wasm32"))]
pub fn load_dotenv() {
    if dotenvy::dotenv().is_ok() {
        return;
    }

    load_bundled_config();
}

#[cfg(target_arch = "wasm32")]
pub fn load_dotenv() {
    load_bundled_config();
}

fn load_bundled_config() {
    for (key, value) in parse_env_lines(BUNDLED_CONFIG) {
        // Only set if not already set (allow env override)
        if env::var(key).is_err() {
            // SAFETY: called once at startup before any threads are spawned
            unsafe {
                env::set_var(key, value);
            }
        }
    }
}

fn parse_env_lines(source: &str) -> impl Iterator<Item = (&str, &str)> {
    source.lines().filter_map(|line| {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            return None;
        }
        let (key, value) = line.split_once('=')?;
        Some((key.trim(), value.trim()))
    })
}
