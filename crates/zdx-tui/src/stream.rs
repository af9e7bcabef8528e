//! Live-render component for an in-flight agent step.
//!
//! Renders either a spinner waiting for first bytes, streaming assistant
//! text as it arrives, or both at once (spinner label under in-progress
//! text). `AppModel` owns exactly one of these and calls `reset()` after
//! every terminal step event.

/// Target animation rate for the spinner tick, in frames per second.
pub const SPINNER_FPS: u32 = 14;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Active,
}

/// The live portion of a streaming step.
pub struct StreamComponent {
    phase: Phase,
    spinning: bool,
    spinner_frame: u32,
    spinner_label: Option<String>,
    text: String,
    /// Rendered-height clamp set by `set_height`; `0` means unconstrained.
    height: usize,
}

impl Default for StreamComponent {
    fn default() -> Self {
        Self::new()
    }
}

impl StreamComponent {
    pub fn new() -> Self {
        Self {
            phase: Phase::Idle,
            spinning: false,
            spinner_frame: 0,
            spinner_label: None,
            text: String::new(),
            height: 0,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_active(&self) -> bool {
        self.phase == Phase::Active
    }

    /// `SpinnerEvent{true}`: enters Active and starts the tick. Idempotent.
    pub fn show_spinner(&mut self) {
        self.phase = Phase::Active;
        self.spinning = true;
    }

    /// Appends a streamed text delta and ensures Active.
    pub fn push_chunk(&mut self, chunk: &str) {
        self.phase = Phase::Active;
        self.text.push_str(chunk);
    }

    /// Sets or clears the "Executing <name>…" spinner label.
    pub fn set_tool_execution(&mut self, name: &str, is_starting: bool) {
        self.spinner_label = is_starting.then(|| format!("Executing {name}…"));
    }

    /// Advances the animation frame. A no-op once `spinning` is false —
    /// the tick loop terminates naturally without an explicit stop signal.
    pub fn tick(&mut self) {
        if self.spinning {
            self.spinner_frame = self.spinner_frame.wrapping_add(1);
        }
    }

    pub fn spinner_frame(&self) -> u32 {
        self.spinner_frame
    }

    pub fn spinner_label(&self) -> Option<&str> {
        self.spinner_label.as_deref()
    }

    /// Clamps rendered output to the last `h` lines, head-truncated so the
    /// most recent bytes remain visible. `0` means unconstrained.
    pub fn set_height(&mut self, h: usize) {
        self.height = h;
    }

    /// Returns the accumulated text, rendered as a styled assistant
    /// message, or empty if nothing was streamed. Used to promote
    /// in-flight text to scrollback on flush.
    pub fn get_rendered_content(&self) -> String {
        if self.text.is_empty() {
            return String::new();
        }
        if self.height == 0 {
            return self.text.clone();
        }
        let lines: Vec<&str> = self.text.lines().collect();
        if lines.len() <= self.height {
            return self.text.clone();
        }
        lines[lines.len() - self.height..].join("\n")
    }

    /// Clears text, stops spinning, returns to Idle.
    pub fn reset(&mut self) {
        self.phase = Phase::Idle;
        self.spinning = false;
        self.spinner_frame = 0;
        self.spinner_label = None;
        self.text.clear();
    }
}
