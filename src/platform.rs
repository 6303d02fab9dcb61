//! Webview capabilities reached through `document::eval`.
//!
//! Every bridge here sends its arguments over the eval channel instead of
//! formatting them into the script, so user text never becomes code.

use crate::speech::{SpeechError, SpeechRecognizer, SpeechSynth, UNSUPPORTED_RECOGNITION_LABEL};
use crate::storage::{KeyValueStore, StorageError};
use crate::theme::SchemeProbe;
use crate::types::{Capability, ThemeMode};
use async_trait::async_trait;
use dioxus::prelude::*;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

const PROBE_JS: &str = r#"
return {
    recognition: ("SpeechRecognition" in window) || ("webkitSpeechRecognition" in window),
    synthesis: ("speechSynthesis" in window) && (typeof SpeechSynthesisUtterance !== "undefined"),
};
"#;

const SPEAK_JS: &str = r#"
const req = await dioxus.recv();
const utter = new SpeechSynthesisUtterance(req.text);
if (req.lang) utter.lang = req.lang;
if (req.voice) {
    const voice = speechSynthesis.getVoices().find(v => v.name === req.voice);
    if (voice) utter.voice = voice;
}
speechSynthesis.speak(utter);
"#;

const RECOGNIZE_JS: &str = r#"
const lang = await dioxus.recv();
const Recognition = window.SpeechRecognition || window.webkitSpeechRecognition;
const recognizer = new Recognition();
recognizer.lang = lang;
recognizer.interimResults = false;
recognizer.continuous = false;
let settled = false;
recognizer.addEventListener("result", e => {
    if (settled) return;
    settled = true;
    dioxus.send(e.results[0][0].transcript);
});
recognizer.addEventListener("end", () => {
    if (settled) return;
    settled = true;
    dioxus.send(null);
});
recognizer.start();
"#;

const STORAGE_GET_JS: &str = r#"
const key = await dioxus.recv();
return localStorage.getItem(key);
"#;

const STORAGE_SET_JS: &str = r#"
const [key, value] = await dioxus.recv();
localStorage.setItem(key, value);
return true;
"#;

const PREFERS_DARK_JS: &str = r#"
return window.matchMedia("(prefers-color-scheme: dark)").matches;
"#;

const SET_THEME_ATTR_JS: &str = r#"
const name = await dioxus.recv();
document.documentElement.dataset.theme = name;
"#;

const FOCUS_JS: &str = r#"
const id = await dioxus.recv();
document.getElementById(id)?.focus();
"#;

const SCROLL_JS: &str = r#"
const id = await dioxus.recv();
const el = document.getElementById(id);
if (el) el.scrollTop = el.scrollHeight;
"#;

// ============================================
// Capability probing
// ============================================

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct Capabilities {
    pub recognition: bool,
    pub synthesis: bool,
}

impl Capabilities {
    pub async fn probe() -> Self {
        match document::eval(PROBE_JS).join::<Capabilities>().await {
            Ok(found) => {
                tracing::info!(
                    recognition = found.recognition,
                    synthesis = found.synthesis,
                    "probed speech capabilities"
                );
                found
            }
            Err(err) => {
                tracing::warn!("capability probe failed: {err}");
                Capabilities::default()
            }
        }
    }

    pub fn synth(&self, lang: &str, voice: Option<&str>) -> Capability<Arc<dyn SpeechSynth>> {
        if self.synthesis {
            Capability::Available(Arc::new(WebSpeechSynth {
                lang: lang.to_string(),
                voice: voice.map(str::to_string),
            }))
        } else {
            Capability::unavailable("Speech synthesis not supported")
        }
    }

    pub fn recognizer(&self, lang: &str) -> Capability<Arc<dyn SpeechRecognizer>> {
        if self.recognition {
            Capability::Available(Arc::new(WebSpeechRecognizer {
                lang: lang.to_string(),
            }))
        } else {
            Capability::unavailable(UNSUPPORTED_RECOGNITION_LABEL)
        }
    }
}

// ============================================
// Speech
// ============================================

#[derive(Serialize)]
struct SpeakRequest<'a> {
    text: &'a str,
    lang: &'a str,
    voice: Option<&'a str>,
}

pub struct WebSpeechSynth {
    lang: String,
    voice: Option<String>,
}

impl SpeechSynth for WebSpeechSynth {
    fn speak(&self, text: &str) -> Result<(), SpeechError> {
        let eval = document::eval(SPEAK_JS);
        eval.send(SpeakRequest {
            text,
            lang: &self.lang,
            voice: self.voice.as_deref(),
        })
        .map_err(|err| SpeechError::Bridge(err.to_string()))
    }
}

pub struct WebSpeechRecognizer {
    lang: String,
}

#[async_trait(?Send)]
impl SpeechRecognizer for WebSpeechRecognizer {
    async fn recognize_once(&self) -> Result<Option<String>, SpeechError> {
        let mut eval = document::eval(RECOGNIZE_JS);
        eval.send(self.lang.as_str())
            .map_err(|err| SpeechError::Bridge(err.to_string()))?;
        eval.recv::<Option<String>>()
            .await
            .map_err(|err| SpeechError::Bridge(err.to_string()))
    }
}

// ============================================
// localStorage and media queries
// ============================================

#[derive(Clone, Copy, Debug, Default)]
pub struct WebStore;

#[async_trait(?Send)]
impl KeyValueStore for WebStore {
    async fn get(&self, key: &str) -> Option<String> {
        let eval = document::eval(STORAGE_GET_JS);
        if let Err(err) = eval.send(key) {
            tracing::warn!("localStorage read failed: {err}");
            return None;
        }
        eval.join::<Option<String>>().await.unwrap_or_else(|err| {
            tracing::warn!("localStorage read failed: {err}");
            None
        })
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let eval = document::eval(STORAGE_SET_JS);
        eval.send((key, value))
            .map_err(|err| StorageError::Bridge(err.to_string()))?;
        eval.join::<bool>()
            .await
            .map(|_| ())
            .map_err(|err| StorageError::Bridge(err.to_string()))
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct MediaSchemeProbe;

#[async_trait(?Send)]
impl SchemeProbe for MediaSchemeProbe {
    async fn prefers_dark(&self) -> bool {
        document::eval(PREFERS_DARK_JS)
            .join::<bool>()
            .await
            .unwrap_or_else(|err| {
                tracing::debug!("color scheme query failed: {err}");
                false
            })
    }
}

// ============================================
// DOM helpers
// ============================================

pub fn set_theme_attribute(mode: ThemeMode) {
    send_to_script(SET_THEME_ATTR_JS, mode.as_str());
}

pub fn focus_element(id: &str) {
    send_to_script(FOCUS_JS, id);
}

pub fn scroll_to_bottom(id: &str) {
    send_to_script(SCROLL_JS, id);
}

fn send_to_script(script: &str, arg: &str) {
    if let Err(err) = document::eval(script).send(arg) {
        tracing::debug!("dom bridge failed: {err}");
    }
}
