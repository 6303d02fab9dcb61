use crate::types::{Message, Role};
use std::sync::{Arc, Mutex};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TypingId(u64);

#[derive(Clone, Debug, PartialEq)]
pub enum LogEntry {
    Message(Message),
    Typing(TypingId),
}

/// Ordered transcript shown in the chat panel.
///
/// Entries are only ever appended; the typing placeholder is the one entry
/// that gets removed again. `revision` changes on every mutation so the view
/// knows when to scroll to the newest entry.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MessageLog {
    entries: Vec<LogEntry>,
    next_typing: u64,
    revision: u64,
}

impl MessageLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, text: impl Into<String>, role: Role) {
        self.push(Message::new(role, text));
    }

    pub fn push(&mut self, message: Message) {
        self.entries.push(LogEntry::Message(message));
        self.revision += 1;
    }

    pub fn push_typing(&mut self) -> TypingId {
        let id = TypingId(self.next_typing);
        self.next_typing += 1;
        self.entries.push(LogEntry::Typing(id));
        self.revision += 1;
        id
    }

    pub fn remove_typing(&mut self, id: TypingId) {
        let before = self.entries.len();
        self.entries
            .retain(|entry| !matches!(entry, LogEntry::Typing(existing) if *existing == id));
        if self.entries.len() != before {
            self.revision += 1;
        }
    }

    pub fn entries(&self) -> &[LogEntry] {
        &self.entries
    }

    pub fn messages(&self) -> impl Iterator<Item = &Message> {
        self.entries.iter().filter_map(|entry| match entry {
            LogEntry::Message(message) => Some(message),
            LogEntry::Typing(_) => None,
        })
    }

    pub fn has_typing(&self) -> bool {
        self.entries
            .iter()
            .any(|entry| matches!(entry, LogEntry::Typing(_)))
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Write access to a log that lives somewhere else (a UI signal, a shared
/// handle in tests).
pub trait LogSink {
    fn append(&self, text: &str, role: Role);
    fn push_typing(&self) -> TypingId;
    fn remove_typing(&self, id: TypingId);
}

/// Thread-safe log handle for headless use.
#[derive(Clone, Debug, Default)]
pub struct SharedLog {
    inner: Arc<Mutex<MessageLog>>,
}

impl SharedLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> MessageLog {
        self.inner.lock().expect("message log poisoned").clone()
    }
}

impl LogSink for SharedLog {
    fn append(&self, text: &str, role: Role) {
        self.inner
            .lock()
            .expect("message log poisoned")
            .append(text, role);
    }

    fn push_typing(&self) -> TypingId {
        self.inner.lock().expect("message log poisoned").push_typing()
    }

    fn remove_typing(&self, id: TypingId) {
        self.inner
            .lock()
            .expect("message log poisoned")
            .remove_typing(id);
    }
}

/// Shows the typing placeholder for as long as the guard is alive.
pub struct TypingGuard<'a, L: LogSink + ?Sized> {
    log: &'a L,
    id: TypingId,
}

impl<'a, L: LogSink + ?Sized> TypingGuard<'a, L> {
    pub fn acquire(log: &'a L) -> Self {
        let id = log.push_typing();
        Self { log, id }
    }
}

impl<L: LogSink + ?Sized> Drop for TypingGuard<'_, L> {
    fn drop(&mut self) {
        self.log.remove_typing(self.id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn append_keeps_order_and_bumps_revision() {
        let mut log = MessageLog::new();
        log.append("hi", Role::User);
        log.append("hello", Role::Bot);

        let texts: Vec<_> = log.messages().map(|m| (m.role, m.text.as_str())).collect();
        assert_eq!(texts, vec![(Role::User, "hi"), (Role::Bot, "hello")]);
        assert_eq!(log.revision(), 2);
    }

    #[test]
    fn removing_unknown_typing_is_a_noop() {
        let mut log = MessageLog::new();
        let id = log.push_typing();
        log.remove_typing(id);
        let revision = log.revision();

        log.remove_typing(id);
        assert_eq!(log.revision(), revision);
        assert!(log.is_empty());
    }

    #[test]
    fn typing_guard_removes_placeholder_on_drop() {
        let log = SharedLog::new();
        {
            let _typing = TypingGuard::acquire(&log);
            assert!(log.snapshot().has_typing());
            log.append("reply", Role::Bot);
        }
        let snapshot = log.snapshot();
        assert!(!snapshot.has_typing());
        assert_eq!(snapshot.len(), 1);
    }

    #[test]
    fn typing_guard_is_released_on_early_return() {
        fn failing(log: &SharedLog) -> Result<(), &'static str> {
            let _typing = TypingGuard::acquire(log);
            let decoded: Result<(), &'static str> = Err("decode failed");
            decoded?;
            Ok(())
        }

        let log = SharedLog::new();
        assert!(failing(&log).is_err());
        assert!(!log.snapshot().has_typing());
    }
}
