use crate::client::ChatBackend;
use crate::intercept::TimeIntercept;
use crate::message_log::{LogSink, TypingGuard};
use crate::speech::SpeechOutput;
use crate::types::Role;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

/// The text box and submit button of the chat form.
pub trait Composer {
    fn text(&self) -> String;
    fn set_text(&self, text: &str);
    /// Disable (`true`) or re-enable (`false`) the submit control.
    fn set_busy(&self, busy: bool);
    fn focus(&self);
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FormState {
    Idle,
    Submitting,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Blank input; nothing happened.
    Empty,
    /// Another submission is still in flight; nothing happened.
    Busy,
    /// Answered locally by the time intercept.
    Intercepted,
    /// The backend replied.
    Replied,
    /// The backend call failed and an error line was logged.
    Failed,
}

pub struct FormController<L, C> {
    log: L,
    composer: C,
    backend: Arc<dyn ChatBackend>,
    speech: SpeechOutput,
    intercept: TimeIntercept,
    submitting: AtomicBool,
}

impl<L: LogSink, C: Composer> FormController<L, C> {
    pub fn new(log: L, composer: C, backend: Arc<dyn ChatBackend>, speech: SpeechOutput) -> Self {
        Self {
            log,
            composer,
            backend,
            speech,
            intercept: TimeIntercept,
            submitting: AtomicBool::new(false),
        }
    }

    pub fn log(&self) -> &L {
        &self.log
    }

    pub fn composer(&self) -> &C {
        &self.composer
    }

    pub fn state(&self) -> FormState {
        if self.submitting.load(Ordering::Acquire) {
            FormState::Submitting
        } else {
            FormState::Idle
        }
    }

    /// Handle one form submission using the composer's current text.
    pub async fn submit(&self) -> SubmitOutcome {
        let raw = self.composer.text();
        let text = raw.trim();
        if text.is_empty() {
            return SubmitOutcome::Empty;
        }

        let Some(_permit) = SubmitPermit::acquire(self) else {
            tracing::debug!("submission rejected, a request is already in flight");
            return SubmitOutcome::Busy;
        };

        self.log.append(text, Role::User);
        self.composer.set_text("");

        if self.intercept.matches(text) {
            let reply = self.intercept.respond();
            self.log.append(&reply, Role::Bot);
            self.speech.speak(&reply);
            return SubmitOutcome::Intercepted;
        }

        let result = {
            let _typing = TypingGuard::acquire(&self.log);
            self.backend.send(text).await
        };

        match result {
            Ok(reply) => {
                self.log.append(&reply, Role::Bot);
                self.speech.speak(&reply);
                SubmitOutcome::Replied
            }
            Err(err) => {
                tracing::warn!("chat request failed: {err}");
                self.log.append(&format!("Error: {err}"), Role::Bot);
                SubmitOutcome::Failed
            }
        }
    }
}

/// Holds the Submitting state; dropping it re-enables the form.
struct SubmitPermit<'a, L, C: Composer> {
    controller: &'a FormController<L, C>,
}

impl<'a, L, C: Composer> SubmitPermit<'a, L, C> {
    fn acquire(controller: &'a FormController<L, C>) -> Option<Self> {
        controller
            .submitting
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()?;
        controller.composer.set_busy(true);
        Some(Self { controller })
    }
}

impl<L, C: Composer> Drop for SubmitPermit<'_, L, C> {
    fn drop(&mut self) {
        self.controller.submitting.store(false, Ordering::Release);
        self.controller.composer.set_busy(false);
        self.controller.composer.focus();
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ComposerState {
    pub text: String,
    pub busy: bool,
    pub focus_count: usize,
}

/// Thread-safe composer handle for headless use.
#[derive(Clone, Debug, Default)]
pub struct SharedComposer {
    inner: Arc<Mutex<ComposerState>>,
}

impl SharedComposer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> ComposerState {
        self.inner.lock().expect("composer poisoned").clone()
    }
}

impl Composer for SharedComposer {
    fn text(&self) -> String {
        self.inner.lock().expect("composer poisoned").text.clone()
    }

    fn set_text(&self, text: &str) {
        self.inner.lock().expect("composer poisoned").text = text.to_string();
    }

    fn set_busy(&self, busy: bool) {
        self.inner.lock().expect("composer poisoned").busy = busy;
    }

    fn focus(&self) {
        self.inner.lock().expect("composer poisoned").focus_count += 1;
    }
}
