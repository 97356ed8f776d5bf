//! # Input Script Parser
//!
//! Scripted keyboard input for deterministic runs and tests.
//!
//! ## Format
//!
//! Scripts are line-based, with each line representing one input action:
//! - Key names: `Enter`, `Backspace`, `Delete`, `Left`, `Right`, `Home`,
//!   `End`, `Space`
//! - Single characters: `a`, `/`, `7`
//! - Text strings: `"mkdir docs"` (expanded to individual key presses)
//! - Commands: `$ mkdir docs` (the text followed by `Enter`)
//! - Comments: `# This is a comment`
//!
//! ## Example
//!
//! ```text
//! # Create a file and fix a typo before running the command
//! $ mkdir /docs
//! "touch /docs/b.txt"
//! Left
//! Left
//! Left
//! Left
//! Backspace
//! a
//! Enter
//! ```

use cli_console::EditKey;
use std::collections::VecDeque;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum InputScriptError {
    #[error("Invalid key name: {0}")]
    InvalidKeyName(String),

    #[error("Parse error at line {line}: {message}")]
    ParseError { line: usize, message: String },

    #[error("Empty script")]
    EmptyScript,
}

/// Parsed script, consumed one key at a time
#[derive(Debug, Clone, Default)]
pub struct InputScript {
    inputs: VecDeque<EditKey>,
}

impl InputScript {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a script from text
    pub fn from_text(text: &str) -> Result<Self, InputScriptError> {
        let mut inputs = VecDeque::new();

        for (line_num, line) in text.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            inputs.extend(Self::parse_line(line, line_num + 1)?);
        }

        if inputs.is_empty() {
            return Err(InputScriptError::EmptyScript);
        }

        Ok(Self { inputs })
    }

    fn parse_line(line: &str, line_num: usize) -> Result<Vec<EditKey>, InputScriptError> {
        if let Some(command) = line.strip_prefix('$') {
            let mut keys = Self::text_keys(command.trim());
            keys.push(EditKey::Enter);
            return Ok(keys);
        }

        if line.starts_with('"') {
            if line.len() < 2 || !line.ends_with('"') {
                return Err(InputScriptError::ParseError {
                    line: line_num,
                    message: "unterminated string".to_string(),
                });
            }
            return Ok(Self::text_keys(&line[1..line.len() - 1]));
        }

        let key = Self::parse_key(line).map_err(|e| InputScriptError::ParseError {
            line: line_num,
            message: e.to_string(),
        })?;
        Ok(vec![key])
    }

    fn text_keys(text: &str) -> Vec<EditKey> {
        text.chars().map(EditKey::Char).collect()
    }

    /// Parses a key name
    fn parse_key(name: &str) -> Result<EditKey, InputScriptError> {
        let mut chars = name.chars();
        if let (Some(c), None) = (chars.next(), chars.next()) {
            return Ok(EditKey::Char(c));
        }

        match name.to_lowercase().as_str() {
            "enter" | "return" => Ok(EditKey::Enter),
            "backspace" | "back" => Ok(EditKey::Backspace),
            "delete" | "del" => Ok(EditKey::Delete),
            "left" | "arrowleft" => Ok(EditKey::Left),
            "right" | "arrowright" => Ok(EditKey::Right),
            "home" => Ok(EditKey::Home),
            "end" => Ok(EditKey::End),
            "space" => Ok(EditKey::Char(' ')),
            _ => Err(InputScriptError::InvalidKeyName(name.to_string())),
        }
    }

    /// Returns the next key, if any
    pub fn next_input(&mut self) -> Option<EditKey> {
        self.inputs.pop_front()
    }

    pub fn has_more(&self) -> bool {
        !self.inputs.is_empty()
    }

    pub fn remaining(&self) -> usize {
        self.inputs.len()
    }
}
