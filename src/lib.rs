//! Parley: a voice-enabled chat widget.
//!
//! The core (log, intercept, client, speech, theme, controller) is headless
//! and works against injected handles. The Dioxus UI and the webview bridges
//! live behind the `app` feature.

pub mod client;
pub mod config;
pub mod controller;
pub mod intercept;
pub mod message_log;
pub mod speech;
pub mod storage;
pub mod theme;
pub mod types;

#[cfg(feature = "app")]
pub mod platform;
#[cfg(feature = "app")]
pub mod ui;
#[cfg(feature = "app")]
pub mod views;

pub use client::{ChatBackend, ChatClient, ChatError};
pub use controller::{Composer, FormController, FormState, SubmitOutcome};
pub use message_log::{LogEntry, LogSink, MessageLog, SharedLog, TypingGuard};
pub use types::{Capability, Message, Role, ThemeMode};
