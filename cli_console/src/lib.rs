//! # CLI Console
//!
//! The FoxOS command shell: line editing, command parsing and dispatch
//! onto the namespace table.
//!
//! It is NOT a POSIX shell. There are no pipes, quoting, globbing or
//! variables; each line is one command with at most a path and, for
//! `write`, the text that follows it.

pub mod commands;
pub mod line_editor;
pub mod shell;

pub use commands::{CommandParseError, ShellCommand, ShellCommandParser};
pub use line_editor::{EditKey, LineEditor, LINE_BUFFER_SIZE};
pub use shell::{fs_message, Shell, ShellError, ShellOutcome, PROMPT, VERSION_BANNER};
