//! Commands the reducer returns for the runtime to execute.
//!
//! Keeps the reducer pure: it only mutates `AppModel` and returns effects,
//! never touches `App` or the terminal directly.

/// Effects returned by `update` for `TuiRuntime` to execute.
#[derive(Debug)]
pub enum UiEffect {
    /// Terminate the UI event loop.
    Quit,
    /// Submit `text` to `App::run`. The runtime calls `run` and updates the
    /// queue badge directly from the returned depth, since queue updates
    /// never originate from inside `run` itself.
    Submit(String),
    /// `App::cancel_current_step()`.
    CancelStep,
    /// `App::clear_messages()`.
    ClearMessages,
    /// `App::clear_queue()`.
    ClearQueue,
    /// Push a response to a pending approval/prompt/overlay channel.
    RespondApproval {
        respond_to: tokio::sync::mpsc::Sender<bool>,
        approved: bool,
    },
    RespondPrompt {
        respond_to: tokio::sync::mpsc::Sender<zdx_core::PromptResponse>,
        response: zdx_core::PromptResponse,
    },
}
