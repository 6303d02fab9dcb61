use crate::client::ChatClient;
use crate::config::WidgetConfig;
use crate::controller::{Composer, FormController, FormState};
use crate::message_log::{LogEntry, LogSink, MessageLog, TypingId};
use crate::platform::{self, Capabilities};
use crate::speech::{MicIndicator, MicState, SpeechError, SpeechInput, SpeechOutput};
use crate::types::{Message, Role};
use dioxus::events::Key;
use dioxus::prelude::*;
use std::rc::Rc;
use std::sync::Arc;
use time::{OffsetDateTime, UtcOffset, format_description::FormatItem, macros::format_description};

const MESSAGES_ID: &str = "messages";
const TEXTBOX_ID: &str = "textbox";

const MESSAGE_TIME_FORMAT: &[FormatItem<'static>] =
    format_description!("[hour repr:12 padding:none]:[minute padding:zero] [period case:upper]");

fn format_message_timestamp(timestamp: OffsetDateTime) -> Option<String> {
    let mut datetime = timestamp;
    if let Ok(offset) = UtcOffset::current_local_offset() {
        datetime = datetime.to_offset(offset);
    }
    datetime.format(MESSAGE_TIME_FORMAT).ok()
}

impl LogSink for Signal<MessageLog> {
    fn append(&self, text: &str, role: Role) {
        let mut log = *self;
        log.with_mut(|log| log.append(text, role));
    }

    fn push_typing(&self) -> TypingId {
        let mut log = *self;
        log.with_mut(|log| log.push_typing())
    }

    fn remove_typing(&self, id: TypingId) {
        let mut log = *self;
        log.with_mut(|log| log.remove_typing(id));
    }
}

impl MicIndicator for Signal<MicState> {
    fn set_mic_state(&self, state: MicState) {
        let mut mic = *self;
        mic.set(state);
    }
}

#[derive(Clone, Copy)]
struct SignalComposer {
    text: Signal<String>,
    busy: Signal<bool>,
}

impl Composer for SignalComposer {
    fn text(&self) -> String {
        self.text.peek().clone()
    }

    fn set_text(&self, text: &str) {
        let mut signal = self.text;
        signal.set(text.to_string());
    }

    fn set_busy(&self, busy: bool) {
        let mut signal = self.busy;
        signal.set(busy);
    }

    fn focus(&self) {
        platform::focus_element(TEXTBOX_ID);
    }
}

type Controller = FormController<Signal<MessageLog>, SignalComposer>;

#[component]
pub fn ChatView(config: Rc<WidgetConfig>, capabilities: Capabilities) -> Element {
    let log = use_signal(MessageLog::new);
    let input = use_signal(String::new);
    let busy = use_signal(|| false);

    let controller: Rc<Controller> = use_hook(|| {
        let speech = SpeechOutput::new(
            capabilities.synth(&config.speech_lang, config.voice.as_deref()),
        );
        Rc::new(FormController::new(
            log,
            SignalComposer { text: input, busy },
            Arc::new(ChatClient::from_config(&config)),
            speech,
        ))
    });
    let speech_input =
        use_hook(|| Rc::new(SpeechInput::new(capabilities.recognizer(&config.speech_lang))));
    let mic = use_signal({
        let speech_input = speech_input.clone();
        move || speech_input.mic_state()
    });

    // Keep the newest entry in view.
    use_effect(move || {
        let _revision = log.read().revision();
        platform::scroll_to_bottom(MESSAGES_ID);
    });

    let submit = {
        let controller = controller.clone();
        move || {
            let controller = controller.clone();
            spawn(async move {
                let outcome = controller.submit().await;
                tracing::debug!(?outcome, "submission finished");
            });
        }
    };

    let on_mic = {
        let controller = controller.clone();
        move |_: MouseEvent| {
            let controller = controller.clone();
            let speech_input = speech_input.clone();
            spawn(async move {
                match speech_input.capture(&mic, controller.as_ref()).await {
                    Ok(Some(outcome)) => tracing::debug!(?outcome, "voice submission finished"),
                    Ok(None) => {}
                    Err(SpeechError::AlreadyListening) => {
                        tracing::debug!("mic pressed while already listening")
                    }
                    Err(err) => tracing::warn!("voice capture failed: {err}"),
                }
            });
        }
    };

    let entries = log.read().entries().to_vec();
    let mic_state = mic();
    let sending = busy() || controller.state() == FormState::Submitting;

    rsx! {
        div { class: "chat",
            div { id: MESSAGES_ID, class: "messages",
                for entry in entries.iter() {
                    {match entry {
                        LogEntry::Message(message) => rsx! { MessageBubble { message: message.clone() } },
                        LogEntry::Typing(_) => rsx! { TypingBubble {} },
                    }}
                }
            }

            div { class: "composer",
                input {
                    id: TEXTBOX_ID,
                    r#type: "text",
                    placeholder: "Type a message…",
                    autocomplete: "off",
                    value: "{input}",
                    oninput: {
                        let mut input = input;
                        move |ev: FormEvent| input.set(ev.value())
                    },
                    onkeydown: {
                        let submit = submit.clone();
                        move |ev: KeyboardEvent| {
                            if ev.key() == Key::Enter && !ev.modifiers().shift() {
                                ev.prevent_default();
                                submit();
                            }
                        }
                    },
                    autofocus: true,
                }
                button {
                    id: "mic",
                    class: "btn btn-ghost",
                    r#type: "button",
                    disabled: mic_state.is_disabled(),
                    title: mic_state.title().to_string(),
                    onmousedown: on_mic,
                    span { class: format_args!("icon icon-{}", mic_state.icon()) }
                }
                button {
                    class: "btn btn-primary",
                    r#type: "button",
                    disabled: sending,
                    onclick: {
                        let submit = submit.clone();
                        move |_: MouseEvent| submit()
                    },
                    "Send"
                }
            }
        }
    }
}

#[component]
fn MessageBubble(message: Message) -> Element {
    let role = message.role.as_str();
    rsx! {
        div { class: format_args!("message-row {role}"),
            div { class: format_args!("message {role}"), "{message.text}" }
            if let Some(ts) = format_message_timestamp(message.created_at) {
                span { class: "message-timestamp", "{ts}" }
            }
        }
    }
}

#[component]
fn TypingBubble() -> Element {
    rsx! {
        div { class: "message-row bot",
            div { class: "message bot typing", aria_label: "Assistant is typing",
                span { class: "dot" }
                span { class: "dot" }
                span { class: "dot" }
            }
        }
    }
}
