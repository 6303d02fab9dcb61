//! Test doubles shared by the integration tests.
#![allow(dead_code)]

use async_trait::async_trait;
use parley::client::{ChatBackend, ChatError, ChatResult};
use parley::speech::{MicIndicator, MicState, SpeechError, SpeechRecognizer, SpeechSynth};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::Notify;

/// Backend that answers every message the same way.
pub struct CannedBackend {
    reply: Result<String, String>,
    calls: AtomicUsize,
}

impl CannedBackend {
    pub fn replying(reply: &str) -> Self {
        Self {
            reply: Ok(reply.to_string()),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing(error: &str) -> Self {
        Self {
            reply: Err(error.to_string()),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait(?Send)]
impl ChatBackend for CannedBackend {
    async fn send(&self, _message: &str) -> ChatResult<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.reply {
            Ok(reply) => Ok(reply.clone()),
            Err(error) => Err(ChatError::Server(error.clone())),
        }
    }
}

/// Backend that holds each request until `release` is called.
#[derive(Default)]
pub struct GatedBackend {
    pub gate: Notify,
    pub received: Mutex<Vec<String>>,
}

impl GatedBackend {
    pub fn release(&self) {
        self.gate.notify_one();
    }
}

#[async_trait(?Send)]
impl ChatBackend for GatedBackend {
    async fn send(&self, message: &str) -> ChatResult<String> {
        self.received.lock().unwrap().push(message.to_string());
        self.gate.notified().await;
        Ok(format!("echo: {message}"))
    }
}

#[derive(Default)]
pub struct RecordingSynth {
    pub spoken: Mutex<Vec<String>>,
}

impl RecordingSynth {
    pub fn spoken(&self) -> Vec<String> {
        self.spoken.lock().unwrap().clone()
    }
}

impl SpeechSynth for RecordingSynth {
    fn speak(&self, text: &str) -> Result<(), SpeechError> {
        self.spoken.lock().unwrap().push(text.to_string());
        Ok(())
    }
}

/// Recognizer that "hears" a fixed result.
pub struct ScriptedRecognizer {
    pub result: Result<Option<String>, String>,
}

#[async_trait(?Send)]
impl SpeechRecognizer for ScriptedRecognizer {
    async fn recognize_once(&self) -> Result<Option<String>, SpeechError> {
        self.result.clone().map_err(SpeechError::Bridge)
    }
}

/// Recognizer that stays listening until `release` is called.
#[derive(Default)]
pub struct GatedRecognizer {
    pub gate: Notify,
    pub sessions: AtomicUsize,
    pub transcript: Option<String>,
}

impl GatedRecognizer {
    pub fn hearing(transcript: &str) -> Self {
        Self {
            transcript: Some(transcript.to_string()),
            ..Self::default()
        }
    }

    pub fn release(&self) {
        self.gate.notify_one();
    }

    pub fn sessions(&self) -> usize {
        self.sessions.load(Ordering::SeqCst)
    }
}

#[async_trait(?Send)]
impl SpeechRecognizer for GatedRecognizer {
    async fn recognize_once(&self) -> Result<Option<String>, SpeechError> {
        self.sessions.fetch_add(1, Ordering::SeqCst);
        self.gate.notified().await;
        Ok(self.transcript.clone())
    }
}

#[derive(Default)]
pub struct RecordingMic {
    pub states: Mutex<Vec<MicState>>,
}

impl RecordingMic {
    pub fn states(&self) -> Vec<MicState> {
        self.states.lock().unwrap().clone()
    }
}

impl MicIndicator for RecordingMic {
    fn set_mic_state(&self, state: MicState) {
        self.states.lock().unwrap().push(state);
    }
}
