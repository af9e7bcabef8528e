//! Conversation data model: messages and the thread-safe store that holds them.

use std::sync::RwLock;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Who produced a [`Message`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    User,
    Assistant,
    Tool,
}

/// A single piece of a message's content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentPart {
    Text { text: String },
    ToolCall { id: String, name: String, input: Value },
    ToolResult { id: String, name: String, output: Value },
}

impl ContentPart {
    pub fn text(text: impl Into<String>) -> Self {
        ContentPart::Text { text: text.into() }
    }
}

/// A single turn in the conversation.
///
/// Messages are value objects: the store deep-copies on insert and on read,
/// so a caller's slice never aliases the store's internal buffer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: Vec<ContentPart>,
}

impl Message {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: vec![ContentPart::text(text)],
        }
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: vec![ContentPart::text(text)],
        }
    }

    /// Concatenates all `Text` parts, in order, separated by newlines.
    pub fn text(&self) -> String {
        self.content
            .iter()
            .filter_map(|part| match part {
                ContentPart::Text { text } => Some(text.as_str()),
                ContentPart::ToolCall { .. } | ContentPart::ToolResult { .. } => None,
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Thread-safe, in-memory conversation history with snapshot semantics.
///
/// Readers take a brief read lock and clone; writers take a brief write
/// lock. Neither ever holds the lock across an `.await` or an external call
/// beyond the configured [`crate::session::SessionSink`], which is itself
/// required to be non-blocking.
pub struct MessageStore {
    messages: RwLock<Vec<Message>>,
    sink: Box<dyn crate::session::SessionSink>,
    /// Caps the number of retained messages, oldest dropped first. `None` is
    /// unbounded.
    limit: Option<usize>,
}

impl MessageStore {
    /// Creates an empty store with no session sink configured.
    pub fn new() -> Self {
        Self::with_sink(Box::new(crate::session::NullSink))
    }

    /// Creates an empty store that persists to `sink` on every mutation.
    pub fn with_sink(sink: Box<dyn crate::session::SessionSink>) -> Self {
        Self {
            messages: RwLock::new(Vec::new()),
            sink,
            limit: None,
        }
    }

    /// Creates a store pre-loaded with `initial`, deep-copied.
    ///
    /// Does **not** re-persist to the sink: the caller is assumed to have
    /// already persisted these messages (e.g. loaded from disk).
    pub fn with_messages(initial: Vec<Message>) -> Self {
        Self {
            messages: RwLock::new(initial),
            sink: Box::new(crate::session::NullSink),
            limit: None,
        }
    }

    /// Caps retained history at `limit` messages, oldest dropped first.
    /// Builder-style; intended to be applied once at construction.
    pub fn with_history_limit(mut self, limit: Option<usize>) -> Self {
        self.limit = limit;
        if let Some(limit) = limit {
            let mut guard = self.messages.write().expect("message store lock poisoned");
            trim_to_limit(&mut guard, limit);
        }
        self
    }

    /// Appends `msg`, persisting the new full history to the sink.
    ///
    /// Persistence happens while `guard` is still held, so two concurrent
    /// `add`/`replace` calls can never have their `persist` calls observed
    /// out of order relative to the mutations that produced them.
    pub fn add(&self, msg: Message) {
        let mut guard = self.messages.write().expect("message store lock poisoned");
        guard.push(msg);
        if let Some(limit) = self.limit {
            trim_to_limit(&mut guard, limit);
        }
        self.persist(&guard);
    }

    /// Atomically replaces the entire history, persisting it to the sink
    /// while the write lock is still held.
    pub fn replace(&self, msgs: Vec<Message>) {
        let mut guard = self.messages.write().expect("message store lock poisoned");
        *guard = msgs;
        if let Some(limit) = self.limit {
            trim_to_limit(&mut guard, limit);
        }
        self.persist(&guard);
    }

    /// Returns a snapshot copy of the full history.
    pub fn get_all(&self) -> Vec<Message> {
        self.messages
            .read()
            .expect("message store lock poisoned")
            .clone()
    }

    /// Empties the store, persisting the (now-empty) history while the
    /// write lock is still held.
    pub fn clear(&self) {
        let mut guard = self.messages.write().expect("message store lock poisoned");
        guard.clear();
        self.persist(&guard);
    }

    /// Number of messages currently held.
    pub fn len(&self) -> usize {
        self.messages.read().expect("message store lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn persist(&self, messages: &[Message]) {
        if let Err(err) = self.sink.replace_all_messages(messages) {
            tracing::warn!(error = %err, "session sink failed to persist messages; continuing");
        }
    }
}

impl Default for MessageStore {
    fn default() -> Self {
        Self::new()
    }
}

fn trim_to_limit(messages: &mut Vec<Message>, limit: usize) {
    if messages.len() > limit {
        let excess = messages.len() - limit;
        messages.drain(0..excess);
    }
}
