//! ApprovalComponent: a modal yes/no dialog.
//!
//! Emits exactly one boolean result, via the response channel embedded in
//! the triggering `ToolApprovalNeeded` event. Never calls the terminate
//! primitive itself.
//!
//! Ctrl+C is handled globally by `update::handle_terminal_event` (spec.md
//! §4.3's "any | Ctrl-C | terminate"), which intercepts it before a key ever
//! reaches a modal component, so this component doesn't also treat Ctrl+C
//! as a deny (spec.md §4.5's component-local "ESC/Ctrl-C deny"): the global
//! quit supersedes it.

use crossterm::event::{KeyCode, KeyEvent};

/// State for a pending tool-approval prompt.
pub struct ApprovalComponent {
    pub tool_name: String,
    pub args_json: serde_json::Value,
    /// `true` highlights "yes".
    highlighted_yes: bool,
}

impl ApprovalComponent {
    pub fn new(tool_name: String, args_json: serde_json::Value) -> Self {
        Self {
            tool_name,
            args_json,
            highlighted_yes: false,
        }
    }

    pub fn highlighted_yes(&self) -> bool {
        self.highlighted_yes
    }

    /// Handles one key event. Returns `Some(bool)` once the user has
    /// committed a decision.
    pub fn handle_key(&mut self, key: KeyEvent) -> Option<bool> {
        match key.code {
            KeyCode::Char('y') | KeyCode::Char('Y') => Some(true),
            KeyCode::Char('n') | KeyCode::Char('N') => Some(false),
            KeyCode::Left | KeyCode::Right => {
                self.highlighted_yes = !self.highlighted_yes;
                None
            }
            KeyCode::Enter => Some(self.highlighted_yes),
            KeyCode::Esc => Some(false),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyModifiers;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn y_commits_true() {
        let mut a = ApprovalComponent::new("bash".into(), serde_json::json!({}));
        assert_eq!(a.handle_key(key(KeyCode::Char('y'))), Some(true));
    }

    #[test]
    fn n_commits_false() {
        let mut a = ApprovalComponent::new("bash".into(), serde_json::json!({}));
        assert_eq!(a.handle_key(key(KeyCode::Char('N'))), Some(false));
    }

    #[test]
    fn esc_denies() {
        let mut a = ApprovalComponent::new("bash".into(), serde_json::json!({}));
        assert_eq!(a.handle_key(key(KeyCode::Esc)), Some(false));
    }

    #[test]
    fn arrows_toggle_then_enter_commits_highlight() {
        let mut a = ApprovalComponent::new("bash".into(), serde_json::json!({}));
        assert_eq!(a.handle_key(key(KeyCode::Left)), None);
        assert!(a.highlighted_yes());
        assert_eq!(a.handle_key(key(KeyCode::Enter)), Some(true));
    }

    #[test]
    fn enter_defaults_to_no() {
        let mut a = ApprovalComponent::new("bash".into(), serde_json::json!({}));
        assert_eq!(a.handle_key(key(KeyCode::Enter)), Some(false));
    }
}
