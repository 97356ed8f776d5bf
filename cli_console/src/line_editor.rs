//! Single-line input editing with a cursor

use hal::ConsoleSink;

/// Size of the input buffer; one byte is reserved, as on the console
pub const LINE_BUFFER_SIZE: usize = 256;

/// Keys the editor understands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditKey {
    Char(char),
    Backspace,
    Delete,
    Left,
    Right,
    Home,
    End,
    Enter,
}

/// Line editor
///
/// Accepts printable ASCII only. Text is inserted at the cursor, and the
/// line is handed back on Enter.
#[derive(Debug, Default, Clone)]
pub struct LineEditor {
    buffer: Vec<u8>,
    cursor: usize,
}

impl LineEditor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(&self) -> &str {
        // Only printable ASCII is ever stored
        core::str::from_utf8(&self.buffer).unwrap_or_default()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.buffer.len() >= LINE_BUFFER_SIZE - 1
    }

    /// Applies one key
    ///
    /// Returns the completed line on Enter, after which the editor is empty.
    pub fn handle_key(&mut self, key: EditKey) -> Option<String> {
        match key {
            EditKey::Char(c) => {
                if (' '..='~').contains(&c) && !self.is_full() {
                    self.buffer.insert(self.cursor, c as u8);
                    self.cursor += 1;
                }
            }
            EditKey::Backspace => {
                if self.cursor > 0 {
                    self.cursor -= 1;
                    self.buffer.remove(self.cursor);
                }
            }
            EditKey::Delete => {
                if self.cursor < self.buffer.len() {
                    self.buffer.remove(self.cursor);
                }
            }
            EditKey::Left => self.cursor = self.cursor.saturating_sub(1),
            EditKey::Right => self.cursor = (self.cursor + 1).min(self.buffer.len()),
            EditKey::Home => self.cursor = 0,
            EditKey::End => self.cursor = self.buffer.len(),
            EditKey::Enter => {
                let line = self.text().to_string();
                self.clear();
                return Some(line);
            }
        }
        None
    }

    /// Feeds every character of `text`, stopping at the first newline
    pub fn type_str(&mut self, text: &str) -> Option<String> {
        for c in text.chars() {
            let key = if c == '\n' { EditKey::Enter } else { EditKey::Char(c) };
            if let Some(line) = self.handle_key(key) {
                return Some(line);
            }
        }
        None
    }

    pub fn clear(&mut self) {
        self.buffer.clear();
        self.cursor = 0;
    }

    /// Echoes the prompt and the pending line
    pub fn render(&self, prompt: &str, console: &mut dyn ConsoleSink) {
        console.write_str(prompt);
        console.write_str(self.text());
    }
}
