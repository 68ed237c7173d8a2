use ratatui::crossterm::event::{KeyCode, KeyModifiers};

use crate::core::constants::MAX_INPUT_LINES;

/// What a key event means for the draft.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputAction {
    /// Hand the draft to the session; the Enter key never reaches the draft.
    Commit,
    /// A literal newline was appended to the draft.
    InsertNewline,
    /// Not an editor concern; ordinary text editing proceeds.
    Ignore,
}

/// Owns the draft text between commits. The draft is copied out on commit
/// and never shared with the conversation log by reference.
#[derive(Debug, Default)]
pub struct InputEditor {
    draft: String,
}

impl InputEditor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn draft(&self) -> &str {
        &self.draft
    }

    pub fn is_empty(&self) -> bool {
        self.draft.is_empty()
    }

    /// Interpret a key event. Enter commits; Shift+Enter inserts a newline.
    /// Alt+Enter also inserts a newline because several terminals do not
    /// report the SHIFT modifier on Enter at all.
    pub fn handle_key(&mut self, code: KeyCode, modifiers: KeyModifiers) -> InputAction {
        match code {
            KeyCode::Enter
                if modifiers.contains(KeyModifiers::SHIFT)
                    || modifiers.contains(KeyModifiers::ALT) =>
            {
                self.draft.push('\n');
                InputAction::InsertNewline
            }
            KeyCode::Enter => InputAction::Commit,
            _ => InputAction::Ignore,
        }
    }

    pub fn insert_char(&mut self, c: char) {
        self.draft.push(c);
    }

    pub fn backspace(&mut self) {
        self.draft.pop();
    }

    /// Move the draft out, leaving the editor empty.
    pub fn take_draft(&mut self) -> String {
        std::mem::take(&mut self.draft)
    }

    /// Put a committed draft back, ahead of anything typed since. Used when
    /// a commit is rejected after the draft was already taken.
    pub fn restore_draft(&mut self, text: String) {
        if self.draft.is_empty() {
            self.draft = text;
        } else {
            self.draft = format!("{text}\n{}", self.draft);
        }
    }

    /// Rows the input affordance should occupy: one per draft line, capped.
    /// Purely presentational. Clamped before narrowing so pathological
    /// drafts cannot overflow the row arithmetic.
    pub fn visible_lines(&self) -> u16 {
        let lines = self.draft.matches('\n').count().saturating_add(1);
        lines.min(MAX_INPUT_LINES as usize) as u16
    }
}
