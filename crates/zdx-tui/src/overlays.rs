//! Prompt overlays: select / confirm / text-input modal surfaces.
//!
//! Each overlay completes by producing exactly one [`PromptResponse`]. ESC
//! always cancels. The caller is responsible for pushing the response
//! through the `respond_to` channel carried by the triggering event.

use crossterm::event::{KeyCode, KeyEvent};
use zdx_core::PromptResponse;

use crate::input::TextBuffer;

pub struct SelectOverlay {
    pub title: String,
    pub options: Vec<String>,
    pub selected: usize,
}

impl SelectOverlay {
    pub fn new(title: String, options: Vec<String>) -> Self {
        Self {
            title,
            options,
            selected: 0,
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> Option<PromptResponse> {
        match key.code {
            KeyCode::Up => {
                if self.selected == 0 {
                    self.selected = self.options.len().saturating_sub(1);
                } else {
                    self.selected -= 1;
                }
                None
            }
            KeyCode::Down => {
                if !self.options.is_empty() {
                    self.selected = (self.selected + 1) % self.options.len();
                }
                None
            }
            KeyCode::Enter => Some(PromptResponse::Selected(self.selected)),
            KeyCode::Esc => Some(PromptResponse::Cancelled),
            _ => None,
        }
    }
}

pub struct ConfirmOverlay {
    pub title: String,
    highlighted_yes: bool,
}

impl ConfirmOverlay {
    pub fn new(title: String, default: bool) -> Self {
        Self {
            title,
            highlighted_yes: default,
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> Option<PromptResponse> {
        match key.code {
            KeyCode::Left | KeyCode::Right => {
                self.highlighted_yes = !self.highlighted_yes;
                None
            }
            KeyCode::Char('y') | KeyCode::Char('Y') => Some(PromptResponse::Confirmed(true)),
            KeyCode::Char('n') | KeyCode::Char('N') => Some(PromptResponse::Confirmed(false)),
            KeyCode::Enter => Some(PromptResponse::Confirmed(self.highlighted_yes)),
            KeyCode::Esc => Some(PromptResponse::Cancelled),
            _ => None,
        }
    }
}

pub struct TextOverlay {
    pub title: String,
    pub placeholder: Option<String>,
    pub buffer: TextBuffer,
}

impl TextOverlay {
    pub fn new(title: String, placeholder: Option<String>) -> Self {
        Self {
            title,
            placeholder,
            buffer: TextBuffer::new(),
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> Option<PromptResponse> {
        match key.code {
            KeyCode::Char(ch) => {
                self.buffer.insert_char(ch);
                None
            }
            KeyCode::Backspace => {
                self.buffer.backspace();
                None
            }
            KeyCode::Enter => Some(PromptResponse::Text(self.buffer.text())),
            KeyCode::Esc => Some(PromptResponse::Cancelled),
            _ => None,
        }
    }
}

pub enum OverlayComponent {
    Select(SelectOverlay),
    Confirm(ConfirmOverlay),
    Text(TextOverlay),
}

impl OverlayComponent {
    pub fn handle_key(&mut self, key: KeyEvent) -> Option<PromptResponse> {
        match self {
            OverlayComponent::Select(o) => o.handle_key(key),
            OverlayComponent::Confirm(o) => o.handle_key(key),
            OverlayComponent::Text(o) => o.handle_key(key),
        }
    }

    pub fn title(&self) -> &str {
        match self {
            OverlayComponent::Select(o) => &o.title,
            OverlayComponent::Confirm(o) => &o.title,
            OverlayComponent::Text(o) => &o.title,
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
    fn select_arrow_navigation_wraps() {
        let mut s = SelectOverlay::new("pick".into(), vec!["a".into(), "b".into(), "c".into()]);
        assert_eq!(s.handle_key(key(KeyCode::Up)), None);
        assert_eq!(s.selected, 2);
        s.handle_key(key(KeyCode::Down));
        s.handle_key(key(KeyCode::Down));
        s.handle_key(key(KeyCode::Down));
        assert_eq!(s.selected, 2);
    }

    #[test]
    fn select_enter_commits_index() {
        let mut s = SelectOverlay::new("pick".into(), vec!["a".into(), "b".into()]);
        s.handle_key(key(KeyCode::Down));
        assert_eq!(s.handle_key(key(KeyCode::Enter)), Some(PromptResponse::Selected(1)));
    }

    #[test]
    fn select_esc_cancels() {
        let mut s = SelectOverlay::new("pick".into(), vec!["a".into()]);
        assert_eq!(s.handle_key(key(KeyCode::Esc)), Some(PromptResponse::Cancelled));
    }

    #[test]
    fn confirm_default_and_toggle() {
        let mut c = ConfirmOverlay::new("sure?".into(), true);
        assert_eq!(c.handle_key(key(KeyCode::Enter)), Some(PromptResponse::Confirmed(true)));
        let mut c2 = ConfirmOverlay::new("sure?".into(), true);
        c2.handle_key(key(KeyCode::Left));
        assert_eq!(c2.handle_key(key(KeyCode::Enter)), Some(PromptResponse::Confirmed(false)));
    }

    #[test]
    fn text_overlay_accumulates_and_submits() {
        let mut t = TextOverlay::new("name?".into(), None);
        t.handle_key(key(KeyCode::Char('h')));
        t.handle_key(key(KeyCode::Char('i')));
        assert_eq!(t.handle_key(key(KeyCode::Enter)), Some(PromptResponse::Text("hi".into())));
    }

    #[test]
    fn text_overlay_esc_cancels() {
        let mut t = TextOverlay::new("name?".into(), None);
        assert_eq!(t.handle_key(key(KeyCode::Esc)), Some(PromptResponse::Cancelled));
    }
}
