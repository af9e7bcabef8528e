//! External session-persistence hook for [`crate::message::MessageStore`].

use anyhow::Result;

use crate::message::Message;

/// Best-effort persistence sink for conversation history.
///
/// Implementors must be non-blocking and bounded: `MessageStore` calls this
/// synchronously while (briefly) holding its write lock, so a slow or
/// blocking implementation would stall every reader of the store.
pub trait SessionSink: Send + Sync {
    fn replace_all_messages(&self, messages: &[Message]) -> Result<()>;
}

/// No-op sink used when no persistence is configured (e.g. headless mode).
pub struct NullSink;

impl SessionSink for NullSink {
    fn replace_all_messages(&self, _messages: &[Message]) -> Result<()> {
        Ok(())
    }
}
