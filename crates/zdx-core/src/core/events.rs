//! The closed taxonomy of events the App emits to the UI.
//!
//! Every variant is a plain value with no hidden references to App-internal
//! state — the UI owns all rendering decisions.

use serde_json::Value;
use tokio::sync::mpsc;

/// Capacity used for response channels embedded in interactive-extension
/// events. Buffered so the sender (App's background worker) never blocks
/// waiting for the UI to read, and the UI never blocks inside its own
/// update loop sending the response.
pub const RESPONSE_CHANNEL_CAPACITY: usize = 1;

/// Events emitted by `App`, consumed by the UI (AppModel).
#[derive(Debug)]
pub enum AppEvent {
    /// Begin/end indeterminate-progress display.
    Spinner { show: bool },
    /// Incremental text delta from streaming.
    StreamChunk { content: String },
    /// A tool is about to execute.
    ToolCallStarted { name: String, args_json: Value },
    /// Start/end of tool runtime (spinner label).
    ToolExecution { name: String, is_starting: bool },
    /// Completion of a tool.
    ToolResult {
        name: String,
        args_json: Value,
        result: Value,
        is_error: bool,
    },
    /// Assistant commentary accompanying a tool call. May duplicate content
    /// already delivered via streaming; the UI must dedupe.
    ToolCallContent { content: String },
    /// Final non-streaming response (empty when streaming delivered
    /// everything).
    ResponseComplete { content: String },
    /// Step finished normally.
    StepComplete { response_text: String },
    /// Step failed. `message` is `None` for a `nil`-equivalent error, which
    /// is accepted and transitions state without error chrome.
    StepError { message: Option<String> },
    /// Step cancelled by the user. The UI flushes partial output and
    /// returns to input state without displaying an error.
    StepCancelled,
    /// Queue depth changed. Emitted only outside the App mutex, only on
    /// pop (never on push, to avoid a `Run`-reentrancy deadlock).
    QueueUpdated { length: usize },
    /// A tool wants user approval before it runs.
    ToolApprovalNeeded {
        name: String,
        args_json: Value,
        respond_to: mpsc::Sender<bool>,
    },
    /// An extension wants to block on a structured user response.
    PromptRequest(PromptRequest),
    /// An extension wants to show a modal overlay.
    OverlayRequest(OverlayRequest),
}

/// A request for one piece of structured user input.
#[derive(Debug)]
pub struct PromptRequest {
    pub message: String,
    pub kind: PromptKind,
    pub respond_to: mpsc::Sender<PromptResponse>,
}

#[derive(Debug, Clone)]
pub enum PromptKind {
    /// A list of choices, arrow-key navigation.
    Select { options: Vec<String> },
    /// Yes/no, with a defaulted highlight.
    Confirm { default: bool },
    /// Free-text input.
    Text { placeholder: Option<String> },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PromptResponse {
    Selected(usize),
    Confirmed(bool),
    Text(String),
    /// ESC always cancels; also used to unblock a sender in non-interactive
    /// mode.
    Cancelled,
}

/// A request to show an overlay (select / confirm / text-input mode, same
/// shape as [`PromptRequest`] but routed separately so the UI can treat
/// overlays and blocking prompts as visually distinct surfaces).
#[derive(Debug)]
pub struct OverlayRequest {
    pub title: String,
    pub kind: PromptKind,
    pub respond_to: mpsc::Sender<PromptResponse>,
}

/// Creates a response channel with the standard buffered capacity.
pub fn response_channel<T>() -> (mpsc::Sender<T>, mpsc::Receiver<T>) {
    mpsc::channel(RESPONSE_CHANNEL_CAPACITY)
}
