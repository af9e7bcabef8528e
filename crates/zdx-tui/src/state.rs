//! AppModel: the UI-side state machine.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

use serde_json::Value;
use tokio::sync::mpsc;

use crate::approval::ApprovalComponent;
use crate::input::InputComponent;
use crate::overlays::OverlayComponent;
use crate::stream::StreamComponent;

/// Duration of the two-stage ESC cancel gesture's warning window.
pub const CANCEL_GESTURE_TIMEOUT: Duration = Duration::from_secs(2);

/// One committed line (or block) in the scrollback region. The terminal
/// owns the actual scrollback buffer; these are what the runtime's
/// `Println` primitive writes into it.
#[derive(Debug, Clone, PartialEq)]
pub enum ScrollbackEntry {
    User(String),
    Assistant(String),
    ToolCall { name: String, args_json: Value },
    ToolResult { name: String, result: Value, is_error: bool },
    System(String),
    Error(String),
}

/// A blocking modal surface: approval, structured prompt, or overlay.
/// Exactly one is active at a time, always entered from `Working` and
/// always returning to `Working`.
pub enum Modal {
    Approval {
        component: ApprovalComponent,
        respond_to: mpsc::Sender<bool>,
    },
    Prompt {
        message: String,
        component: OverlayComponent,
        respond_to: mpsc::Sender<zdx_core::PromptResponse>,
    },
    Overlay {
        component: OverlayComponent,
        respond_to: mpsc::Sender<zdx_core::PromptResponse>,
    },
}

/// The three-state machine driving the UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Input,
    Working,
}

pub struct AppModel {
    pub phase: Phase,
    pub modal: Option<Modal>,
    pub stream: StreamComponent,
    pub input: InputComponent,
    pub scrollback: Vec<ScrollbackEntry>,
    /// Cached queue depth for badge rendering, updated either directly by
    /// the runtime (on submit) or via `QueueUpdatedEvent`.
    pub queue_len: usize,
    /// Submitted-but-not-yet-started prompt text, FIFO; popped on each
    /// `QueueUpdatedEvent` with a strictly smaller length.
    pub pending_queue: VecDeque<String>,
    /// Whether a step already streamed content this turn (dedupe flag for
    /// `ResponseCompleteEvent`).
    pub streamed_this_step: bool,
    /// First-ESC warning state and its expiry, while `Working`.
    pub canceling: bool,
    cancel_deadline: Option<Instant>,
    pub should_quit: bool,
}

impl Default for AppModel {
    fn default() -> Self {
        Self::new()
    }
}

impl AppModel {
    pub fn new() -> Self {
        Self {
            phase: Phase::Input,
            modal: None,
            stream: StreamComponent::new(),
            input: InputComponent::new(),
            scrollback: Vec::new(),
            queue_len: 0,
            pending_queue: VecDeque::new(),
            streamed_this_step: false,
            canceling: false,
            cancel_deadline: None,
            should_quit: false,
        }
    }

    pub fn start_cancel_gesture(&mut self, now: Instant) {
        self.canceling = true;
        self.cancel_deadline = Some(now + CANCEL_GESTURE_TIMEOUT);
    }

    pub fn clear_cancel_gesture(&mut self) {
        self.canceling = false;
        self.cancel_deadline = None;
    }

    /// Called on every `Tick`; clears `canceling` once the 2s window has
    /// elapsed without a confirming second ESC.
    pub fn expire_cancel_gesture_if_due(&mut self, now: Instant) {
        if let Some(deadline) = self.cancel_deadline
            && now >= deadline
        {
            self.clear_cancel_gesture();
        }
    }
}
