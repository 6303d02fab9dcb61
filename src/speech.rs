//! Speech output (text-to-speech) and single-utterance speech input.
//!
//! Both sides wrap a platform engine that is probed once at startup and held
//! as a [`Capability`]. Call sites never check for support themselves.

use crate::controller::{Composer, FormController, FormState, SubmitOutcome};
use crate::message_log::LogSink;
use crate::types::Capability;
use async_trait::async_trait;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

pub const UNSUPPORTED_RECOGNITION_LABEL: &str = "Speech Recognition not supported";

#[derive(Debug, thiserror::Error)]
pub enum SpeechError {
    #[error("{0}")]
    Unsupported(String),
    #[error("already listening")]
    AlreadyListening,
    #[error("speech bridge failed: {0}")]
    Bridge(String),
}

/// Platform text-to-speech engine.
pub trait SpeechSynth {
    /// Queue `text` for playback. Returns once queued, not once spoken.
    fn speak(&self, text: &str) -> Result<(), SpeechError>;
}

/// Platform speech recognizer.
#[async_trait(?Send)]
pub trait SpeechRecognizer {
    /// Capture one utterance and resolve with the best transcript of the
    /// first result, or `None` when capture ended without one.
    async fn recognize_once(&self) -> Result<Option<String>, SpeechError>;
}

#[derive(Clone)]
pub struct SpeechOutput {
    synth: Capability<Arc<dyn SpeechSynth>>,
}

impl SpeechOutput {
    pub fn new(synth: Capability<Arc<dyn SpeechSynth>>) -> Self {
        Self { synth }
    }

    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self::new(Capability::unavailable(reason))
    }

    pub fn is_available(&self) -> bool {
        self.synth.is_available()
    }

    /// Speak `text` if a synthesizer exists. Failures are logged and dropped.
    pub fn speak(&self, text: &str) {
        match &self.synth {
            Capability::Available(synth) => {
                if let Err(err) = synth.speak(text) {
                    tracing::warn!("speech synthesis failed: {err}");
                }
            }
            Capability::Unavailable { reason } => {
                tracing::debug!("skipping speech output: {reason}");
            }
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MicState {
    Idle,
    Listening,
    Unsupported { reason: String },
}

impl MicState {
    pub fn icon(&self) -> &'static str {
        match self {
            MicState::Listening => "square",
            MicState::Idle | MicState::Unsupported { .. } => "mic",
        }
    }

    pub fn title(&self) -> &str {
        match self {
            MicState::Idle => "Start voice input",
            MicState::Listening => "Listening…",
            MicState::Unsupported { reason } => reason,
        }
    }

    pub fn is_disabled(&self) -> bool {
        matches!(self, MicState::Unsupported { .. })
    }
}

/// Receives mic state changes so the control can swap its icon.
pub trait MicIndicator {
    fn set_mic_state(&self, state: MicState);
}

pub struct SpeechInput {
    recognizer: Capability<Arc<dyn SpeechRecognizer>>,
    listening: AtomicBool,
}

impl SpeechInput {
    pub fn new(recognizer: Capability<Arc<dyn SpeechRecognizer>>) -> Self {
        Self {
            recognizer,
            listening: AtomicBool::new(false),
        }
    }

    pub fn mic_state(&self) -> MicState {
        match &self.recognizer {
            Capability::Unavailable { reason } => MicState::Unsupported {
                reason: reason.clone(),
            },
            Capability::Available(_) if self.listening.load(Ordering::Acquire) => {
                MicState::Listening
            }
            Capability::Available(_) => MicState::Idle,
        }
    }

    /// Listen for one utterance, write it into the composer and submit it.
    ///
    /// Returns `Ok(None)` when nothing was recognized. Only one capture runs
    /// at a time; a second call while listening fails with
    /// [`SpeechError::AlreadyListening`] and leaves the indicator alone. The
    /// mic indicator is reset when capture ends, whatever the result.
    ///
    /// A transcript heard while a submission is still pending is dropped and
    /// the composer keeps its draft.
    pub async fn capture<L, C, M>(
        &self,
        indicator: &M,
        controller: &FormController<L, C>,
    ) -> Result<Option<SubmitOutcome>, SpeechError>
    where
        L: LogSink,
        C: Composer,
        M: MicIndicator + ?Sized,
    {
        let recognizer = match &self.recognizer {
            Capability::Available(recognizer) => recognizer,
            Capability::Unavailable { reason } => {
                return Err(SpeechError::Unsupported(reason.clone()));
            }
        };

        let transcript = {
            let Some(_listening) = ListeningGuard::start(self, indicator) else {
                return Err(SpeechError::AlreadyListening);
            };
            recognizer.recognize_once().await?
        };

        let Some(transcript) = transcript.filter(|text| !text.trim().is_empty()) else {
            tracing::debug!("speech capture ended without a result");
            return Ok(None);
        };

        tracing::info!("recognized speech: {transcript}");
        if controller.state() == FormState::Submitting {
            tracing::debug!("dropping transcript, a request is already in flight");
            return Ok(Some(SubmitOutcome::Busy));
        }
        controller.composer().set_text(&transcript);
        Ok(Some(controller.submit().await))
    }
}

struct ListeningGuard<'a, M: MicIndicator + ?Sized> {
    input: &'a SpeechInput,
    indicator: &'a M,
}

impl<'a, M: MicIndicator + ?Sized> ListeningGuard<'a, M> {
    fn start(input: &'a SpeechInput, indicator: &'a M) -> Option<Self> {
        input
            .listening
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()?;
        indicator.set_mic_state(MicState::Listening);
        Some(Self { input, indicator })
    }
}

impl<M: MicIndicator + ?Sized> Drop for ListeningGuard<'_, M> {
    fn drop(&mut self) {
        self.input.listening.store(false, Ordering::Release);
        self.indicator.set_mic_state(MicState::Idle);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingSynth {
        spoken: Mutex<Vec<String>>,
    }

    impl SpeechSynth for RecordingSynth {
        fn speak(&self, text: &str) -> Result<(), SpeechError> {
            self.spoken.lock().unwrap().push(text.to_string());
            Ok(())
        }
    }

    struct BrokenSynth;

    impl SpeechSynth for BrokenSynth {
        fn speak(&self, _text: &str) -> Result<(), SpeechError> {
            Err(SpeechError::Bridge("no voices".into()))
        }
    }

    #[test]
    fn speak_forwards_to_synth() {
        let synth = Arc::new(RecordingSynth::default());
        let output = SpeechOutput::new(Capability::Available(synth.clone()));
        output.speak("hello");
        assert_eq!(*synth.spoken.lock().unwrap(), vec!["hello".to_string()]);
    }

    #[test]
    fn speak_swallows_failures_and_missing_engine() {
        SpeechOutput::new(Capability::Available(Arc::new(BrokenSynth))).speak("hello");
        let output = SpeechOutput::unavailable("no speechSynthesis");
        assert!(!output.is_available());
        output.speak("hello");
    }

    #[test]
    fn mic_state_reflects_capability() {
        let input = SpeechInput::new(Capability::unavailable(UNSUPPORTED_RECOGNITION_LABEL));
        let state = input.mic_state();
        assert!(state.is_disabled());
        assert_eq!(state.title(), UNSUPPORTED_RECOGNITION_LABEL);
        assert_eq!(MicState::Listening.icon(), "square");
        assert_eq!(MicState::Idle.icon(), "mic");
    }
}
