//! Application-orchestration core for an agentic coding-assistant CLI.
//!
//! This crate owns the `App` orchestrator, its event taxonomy, the
//! conversation history store, and the `PromptExecutor` seam to the (opaque,
//! out-of-scope) LLM SDK. It has no UI: `zdx-tui` and `zdx-cli` are its
//! two consumers.

pub mod config;
pub mod core;
pub mod error;
pub mod message;
pub mod sdk;
pub mod session;
#[cfg(any(test, feature = "testing"))]
pub mod testing;
pub mod usage;

pub use core::agent::{App, EventSink};
pub use core::events::{
    AppEvent, OverlayRequest, PromptKind, PromptRequest, PromptResponse, response_channel,
};
pub use error::AppError;
pub use message::{ContentPart, Message, MessageStore, Role};
pub use sdk::{PromptExecutor, SdkEvent, TurnResult};
pub use session::{NullSink, SessionSink};
pub use usage::{Usage, UsageTracker};
