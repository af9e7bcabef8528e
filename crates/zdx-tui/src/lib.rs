//! Interactive terminal UI for the agentic coding-assistant CLI.
//!
//! Consumes `zdx-core`'s `App` orchestrator and its event taxonomy; owns
//! all rendering, key handling, and terminal lifecycle.

pub mod approval;
pub mod effects;
pub mod events;
pub mod input;
pub mod layout;
pub mod overlays;
pub mod render;
pub mod runtime;
pub mod state;
pub mod stream;
pub mod terminal;
pub mod update;

pub use effects::UiEffect;
pub use events::UiEvent;
pub use runtime::TuiRuntime;
pub use state::{AppModel, Modal, Phase, ScrollbackEntry};
