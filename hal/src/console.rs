//! Character console abstraction
//!
//! The shell reports results and errors through a [`ConsoleSink`]. On the
//! target this is the VGA text buffer; on the host it is stdout or an
//! in-memory [`BufferConsole`].

use core::fmt;

/// A stream of characters going to a display
pub trait ConsoleSink {
    /// Emits one character; `'\n'` moves to the next line
    fn put_char(&mut self, c: char);

    /// Emits a string
    fn write_str(&mut self, s: &str) {
        for c in s.chars() {
            self.put_char(c);
        }
    }

    /// Clears the screen
    fn clear(&mut self);
}

/// Adapts a [`ConsoleSink`] to [`fmt::Write`] so `write!` can target it
pub struct ConsoleWriter<'a, C: ConsoleSink + ?Sized>(pub &'a mut C);

impl<C: ConsoleSink + ?Sized> fmt::Write for ConsoleWriter<'_, C> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.0.write_str(s);
        Ok(())
    }
}

/// Console that records everything written to it
#[derive(Debug, Default, Clone)]
pub struct BufferConsole {
    text: String,
    clears: usize,
}

impl BufferConsole {
    pub fn new() -> Self {
        Self::default()
    }

    /// Text written since the last clear
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Number of times the screen was cleared
    pub fn clear_count(&self) -> usize {
        self.clears
    }

    /// Returns the captured text and empties the buffer
    pub fn take(&mut self) -> String {
        std::mem::take(&mut self.text)
    }
}

impl ConsoleSink for BufferConsole {
    fn put_char(&mut self, c: char) {
        self.text.push(c);
    }

    fn write_str(&mut self, s: &str) {
        self.text.push_str(s);
    }

    fn clear(&mut self) {
        self.text.clear();
        self.clears += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::fmt::Write;

    #[test]
    fn test_buffer_console_collects_text() {
        let mut console = BufferConsole::new();
        console.put_char('>');
        console.write_str(" ls\n");
        assert_eq!(console.text(), "> ls\n");
    }

    #[test]
    fn test_clear_resets_text() {
        let mut console = BufferConsole::new();
        console.write_str("old");
        console.clear();
        assert_eq!(console.text(), "");
        assert_eq!(console.clear_count(), 1);
    }

    #[test]
    fn test_writer_formats() {
        let mut console = BufferConsole::new();
        write!(ConsoleWriter(&mut console), "{} entries", 3).unwrap();
        assert_eq!(console.take(), "3 entries");
        assert_eq!(console.text(), "");
    }
}
