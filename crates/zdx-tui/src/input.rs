//! InputComponent: an editable textarea with a slash-command popup.

use unicode_segmentation::UnicodeSegmentation;

/// A slash command recognized by the registry.
#[derive(Debug, Clone, Copy)]
pub struct SlashCommand {
    pub name: &'static str,
    pub description: &'static str,
}

/// Commands the input popup offers. `/quit` and `/clear` are handled
/// directly by `AppModel`; anything else (including `/clear-queue`) is
/// forwarded to the parent as a submit event so it can update visible
/// state without the input component needing to know about App/queue
/// internals.
pub const SLASH_COMMANDS: &[SlashCommand] = &[
    SlashCommand {
        name: "quit",
        description: "Exit the application",
    },
    SlashCommand {
        name: "clear",
        description: "Clear the message store",
    },
    SlashCommand {
        name: "clear-queue",
        description: "Drop all queued prompts",
    },
];

/// A minimal multi-line text buffer with a (row, col) cursor, in char units.
#[derive(Debug, Clone, Default)]
pub struct TextBuffer {
    lines: Vec<String>,
    row: usize,
    col: usize,
}

impl TextBuffer {
    pub fn new() -> Self {
        Self {
            lines: vec![String::new()],
            row: 0,
            col: 0,
        }
    }

    pub fn text(&self) -> String {
        self.lines.join("\n")
    }

    pub fn is_empty(&self) -> bool {
        self.lines.len() == 1 && self.lines[0].is_empty()
    }

    pub fn set_text(&mut self, text: &str) {
        self.lines = if text.is_empty() {
            vec![String::new()]
        } else {
            text.split('\n').map(str::to_string).collect()
        };
        self.row = self.lines.len() - 1;
        self.col = self.lines[self.row].graphemes(true).count();
    }

    pub fn clear(&mut self) {
        self.lines = vec![String::new()];
        self.row = 0;
        self.col = 0;
    }

    pub fn insert_char(&mut self, ch: char) {
        let line = &mut self.lines[self.row];
        let byte_idx = Self::char_to_byte(line, self.col);
        line.insert(byte_idx, ch);
        self.col += 1;
    }

    pub fn insert_newline(&mut self) {
        let line = self.lines[self.row].clone();
        let byte_idx = Self::char_to_byte(&line, self.col);
        let (head, tail) = line.split_at(byte_idx);
        self.lines[self.row] = head.to_string();
        self.lines.insert(self.row + 1, tail.to_string());
        self.row += 1;
        self.col = 0;
    }

    pub fn backspace(&mut self) {
        if self.col > 0 {
            let line = &mut self.lines[self.row];
            let start = Self::char_to_byte(line, self.col - 1);
            let end = Self::char_to_byte(line, self.col);
            line.replace_range(start..end, "");
            self.col -= 1;
        } else if self.row > 0 {
            let current = self.lines.remove(self.row);
            self.row -= 1;
            self.col = self.lines[self.row].graphemes(true).count();
            self.lines[self.row].push_str(&current);
        }
    }

    fn char_to_byte(line: &str, col: usize) -> usize {
        line.char_indices()
            .nth(col)
            .map_or(line.len(), |(idx, _)| idx)
    }
}

/// Result of handling a key in the input component.
pub enum InputOutcome {
    /// No visible effect outside the textarea.
    Handled,
    /// Enter was pressed with a non-empty buffer and no popup open: submit
    /// the text (the parent decides how to route `/quit` and `/clear`
    /// directly vs. forwarding everything else).
    Submit(String),
}

/// The editable textarea plus its slash-command popup.
pub struct InputComponent {
    pub buffer: TextBuffer,
    popup_open: bool,
    popup_selected: usize,
}

impl Default for InputComponent {
    fn default() -> Self {
        Self::new()
    }
}

impl InputComponent {
    pub fn new() -> Self {
        Self {
            buffer: TextBuffer::new(),
            popup_open: false,
            popup_selected: 0,
        }
    }

    pub fn text(&self) -> String {
        self.buffer.text()
    }

    pub fn popup_open(&self) -> bool {
        self.popup_open
    }

    fn matching_commands(&self) -> Vec<&'static SlashCommand> {
        let text = self.buffer.text();
        let Some(query) = text.strip_prefix('/') else {
            return Vec::new();
        };
        SLASH_COMMANDS
            .iter()
            .filter(|cmd| cmd.name.starts_with(query))
            .collect()
    }

    fn sync_popup(&mut self) {
        let text = self.buffer.text();
        self.popup_open = text.starts_with('/') && !text.contains('\n') && !self.matching_commands().is_empty();
        if !self.popup_open {
            self.popup_selected = 0;
        }
    }

    pub fn insert_char(&mut self, ch: char) {
        self.buffer.insert_char(ch);
        self.sync_popup();
    }

    pub fn insert_newline(&mut self) {
        self.buffer.insert_newline();
        self.sync_popup();
    }

    pub fn backspace(&mut self) {
        self.buffer.backspace();
        self.sync_popup();
    }

    pub fn popup_move(&mut self, down: bool) {
        if !self.popup_open {
            return;
        }
        let count = self.matching_commands().len();
        if count == 0 {
            return;
        }
        if down {
            self.popup_selected = (self.popup_selected + 1) % count;
        } else {
            self.popup_selected = (self.popup_selected + count - 1) % count;
        }
    }

    /// Enter: selects the highlighted popup entry if open, otherwise submits
    /// the buffer (when non-empty).
    pub fn enter(&mut self) -> InputOutcome {
        if self.popup_open {
            let matches = self.matching_commands();
            if let Some(cmd) = matches.get(self.popup_selected) {
                let text = format!("/{}", cmd.name);
                self.clear();
                return InputOutcome::Submit(text);
            }
        }
        let text = self.buffer.text();
        if text.trim().is_empty() {
            return InputOutcome::Handled;
        }
        self.clear();
        InputOutcome::Submit(text)
    }

    pub fn clear(&mut self) {
        self.buffer.clear();
        self.popup_open = false;
        self.popup_selected = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn typing_slash_opens_popup() {
        let mut input = InputComponent::new();
        for ch in "/cl".chars() {
            input.insert_char(ch);
        }
        assert!(input.popup_open());
    }

    #[test]
    fn enter_with_empty_buffer_is_handled_not_submit() {
        let mut input = InputComponent::new();
        assert!(matches!(input.enter(), InputOutcome::Handled));
    }

    #[test]
    fn enter_submits_non_empty_text_and_clears() {
        let mut input = InputComponent::new();
        for ch in "hello".chars() {
            input.insert_char(ch);
        }
        match input.enter() {
            InputOutcome::Submit(text) => assert_eq!(text, "hello"),
            InputOutcome::Handled => panic!("expected submit"),
        }
        assert!(input.buffer.is_empty());
    }

    #[test]
    fn enter_with_popup_open_selects_highlighted_command() {
        let mut input = InputComponent::new();
        for ch in "/cl".chars() {
            input.insert_char(ch);
        }
        assert!(input.popup_open());
        match input.enter() {
            InputOutcome::Submit(text) => assert!(text == "/clear" || text == "/clear-queue"),
            InputOutcome::Handled => panic!("expected submit"),
        }
    }

    #[test]
    fn newline_insertion_closes_popup() {
        let mut input = InputComponent::new();
        for ch in "/cl".chars() {
            input.insert_char(ch);
        }
        input.insert_newline();
        assert!(!input.popup_open());
    }

    #[test]
    fn backspace_removes_last_char() {
        let mut input = InputComponent::new();
        input.insert_char('a');
        input.insert_char('b');
        input.backspace();
        assert_eq!(input.text(), "a");
    }
}
