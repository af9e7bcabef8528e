//! The SDK collaborator interface.
//!
//! The LLM SDK itself is out of scope for this crate: it is treated as an
//! opaque "prompt executor" that returns a final turn result and, for the
//! duration of one step, streams intermediate events through a
//! subscription. `App` is generic over this trait (static dispatch — the
//! concrete executor is fixed for the lifetime of one `App`), which keeps
//! the seam a plain trait bound instead of a `dyn` object.

use serde::Serialize;
use serde_json::Value;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::message::Message;
use crate::usage::Usage;

/// The structured outcome of one agent step.
#[derive(Debug, Clone, Serialize)]
pub struct TurnResult {
    /// Final accumulated text from the assistant.
    pub final_text: String,
    /// The full, authoritative conversation after this step (including any
    /// tool calls/results the SDK performed internally).
    pub messages: Vec<Message>,
    /// Usage counters for this turn, if the provider reported them.
    pub usage: Option<Usage>,
}

/// Intermediate events the SDK may emit during one step, for the duration
/// of the subscription returned by [`PromptExecutor::subscribe`].
#[derive(Debug)]
pub enum SdkEvent {
    TurnStarted,
    AssistantDelta { text: String },
    AssistantCompleted { text: String },
    /// Assistant commentary accompanying a tool call. May duplicate text
    /// already delivered via `AssistantDelta`; the App drops it whenever
    /// streaming has already delivered content for this step.
    ToolCallContent { text: String },
    ToolRequested { id: String, name: String, input: Value },
    ToolStarted { id: String, name: String },
    ToolCompleted { id: String, name: String, result: Value, is_error: bool },
    /// A tool wants approval before it runs. The executor owns
    /// `respond_to` and blocks on it internally; the App only forwards it.
    ToolApprovalNeeded {
        id: String,
        name: String,
        input: Value,
        respond_to: mpsc::Sender<bool>,
    },
}

/// An opaque prompt executor: the external LLM SDK collaborator.
///
/// `App` calls [`PromptExecutor::subscribe`] once per step, then calls
/// [`PromptExecutor::prompt_result`]; dropping the returned receiver (which
/// happens automatically when `executeStep` returns) is the unsubscribe
/// signal — implementations should stop sending, or tolerate a closed
/// channel silently, once the receiver is gone.
pub trait PromptExecutor: Send + Sync + 'static {
    /// Registers a listener for the next step's intermediate events.
    fn subscribe(&self) -> mpsc::UnboundedReceiver<SdkEvent>;

    /// Runs one full agent step and returns its outcome.
    ///
    /// Implementations must honor `token`: once cancelled, they should
    /// return promptly (an error is fine; the App treats any error
    /// returned after cancellation as a cancellation, not a failure).
    fn prompt_result(
        &self,
        token: CancellationToken,
        history: &[Message],
        prompt: &str,
    ) -> impl std::future::Future<Output = anyhow::Result<TurnResult>> + Send;
}
