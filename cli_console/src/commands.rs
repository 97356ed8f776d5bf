//! # Shell Commands
//!
//! Parses one input line into a [`ShellCommand`].
//!
//! ## Command Set
//!
//! - `help` - List commands
//! - `clear` - Clear the screen
//! - `version` - Print the version banner
//! - `pwd` - Print the current directory
//! - `ls [path]` - List a directory
//! - `cd [path]` - Change directory (`/` without an argument)
//! - `mkdir <path>` - Create a directory
//! - `touch <path>` - Create an empty file
//! - `rm <path>` - Remove a file or an empty directory
//! - `cat <path>` - Print file content
//! - `write <path> <text...>` - Replace file content
//! - `stat <path>` - Show entry metadata
//! - `sync` - Save the table to disk
//! - `exit` - Leave the shell
//!
//! Paths are passed through untouched; the shell resolves them against its
//! current directory.

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CommandParseError {
    #[error("empty command")]
    Empty,

    #[error("Unknown command: {0}")]
    UnknownCommand(String),

    #[error("{command}: missing {argument}")]
    MissingArgument {
        command: &'static str,
        argument: &'static str,
    },

    #[error("{command}: unexpected argument {argument}")]
    UnexpectedArgument {
        command: &'static str,
        argument: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellCommand {
    Help,
    Clear,
    Version,
    Pwd,
    Ls { path: Option<String> },
    Cd { path: Option<String> },
    Mkdir { path: String },
    Touch { path: String },
    Rm { path: String },
    Cat { path: String },
    Write { path: String, text: String },
    Stat { path: String },
    Sync,
    Exit,
}

impl ShellCommand {
    /// Command names with their one-line help, in display order
    pub const HELP: &'static [(&'static str, &'static str)] = &[
        ("help", "Show this help"),
        ("clear", "Clear screen"),
        ("version", "Show version"),
        ("pwd", "Print working directory"),
        ("ls", "List directory contents"),
        ("cd", "Change directory"),
        ("mkdir", "Create directory"),
        ("touch", "Create empty file"),
        ("rm", "Remove file or empty directory"),
        ("cat", "Print file contents"),
        ("write", "Replace file contents"),
        ("stat", "Show file information"),
        ("sync", "Save file system to disk"),
        ("exit", "Leave the shell"),
    ];

    /// Name the command was invoked by
    pub fn name(&self) -> &'static str {
        match self {
            ShellCommand::Help => "help",
            ShellCommand::Clear => "clear",
            ShellCommand::Version => "version",
            ShellCommand::Pwd => "pwd",
            ShellCommand::Ls { .. } => "ls",
            ShellCommand::Cd { .. } => "cd",
            ShellCommand::Mkdir { .. } => "mkdir",
            ShellCommand::Touch { .. } => "touch",
            ShellCommand::Rm { .. } => "rm",
            ShellCommand::Cat { .. } => "cat",
            ShellCommand::Write { .. } => "write",
            ShellCommand::Stat { .. } => "stat",
            ShellCommand::Sync => "sync",
            ShellCommand::Exit => "exit",
        }
    }
}

pub struct ShellCommandParser;

impl ShellCommandParser {
    /// Parses a command line
    ///
    /// The command word is matched case-insensitively. Only `write` keeps
    /// the raw remainder of the line (inner spacing included) as its text.
    pub fn parse(input: &str) -> Result<ShellCommand, CommandParseError> {
        let (word, rest) = split_word(input);
        if word.is_empty() {
            return Err(CommandParseError::Empty);
        }

        match word.to_ascii_lowercase().as_str() {
            "help" => Self::no_args("help", rest, ShellCommand::Help),
            "clear" => Self::no_args("clear", rest, ShellCommand::Clear),
            "version" => Self::no_args("version", rest, ShellCommand::Version),
            "pwd" => Self::no_args("pwd", rest, ShellCommand::Pwd),
            "sync" => Self::no_args("sync", rest, ShellCommand::Sync),
            "exit" | "quit" => Self::no_args("exit", rest, ShellCommand::Exit),
            "ls" => Ok(ShellCommand::Ls {
                path: Self::optional_path("ls", rest)?,
            }),
            "cd" => Ok(ShellCommand::Cd {
                path: Self::optional_path("cd", rest)?,
            }),
            "mkdir" => Ok(ShellCommand::Mkdir {
                path: Self::required_path("mkdir", rest)?,
            }),
            "touch" => Ok(ShellCommand::Touch {
                path: Self::required_path("touch", rest)?,
            }),
            "rm" => Ok(ShellCommand::Rm {
                path: Self::required_path("rm", rest)?,
            }),
            "cat" => Ok(ShellCommand::Cat {
                path: Self::required_path("cat", rest)?,
            }),
            "stat" => Ok(ShellCommand::Stat {
                path: Self::required_path("stat", rest)?,
            }),
            "write" => Self::parse_write(rest),
            _ => Err(CommandParseError::UnknownCommand(input.trim().to_string())),
        }
    }

    fn no_args(
        command: &'static str,
        rest: &str,
        parsed: ShellCommand,
    ) -> Result<ShellCommand, CommandParseError> {
        let (extra, _) = split_word(rest);
        if !extra.is_empty() {
            return Err(CommandParseError::UnexpectedArgument {
                command,
                argument: extra.to_string(),
            });
        }
        Ok(parsed)
    }

    fn optional_path(
        command: &'static str,
        rest: &str,
    ) -> Result<Option<String>, CommandParseError> {
        let (path, tail) = split_word(rest);
        if path.is_empty() {
            return Ok(None);
        }
        let (extra, _) = split_word(tail);
        if !extra.is_empty() {
            return Err(CommandParseError::UnexpectedArgument {
                command,
                argument: extra.to_string(),
            });
        }
        Ok(Some(path.to_string()))
    }

    fn required_path(command: &'static str, rest: &str) -> Result<String, CommandParseError> {
        Self::optional_path(command, rest)?.ok_or(CommandParseError::MissingArgument {
            command,
            argument: "path",
        })
    }

    fn parse_write(rest: &str) -> Result<ShellCommand, CommandParseError> {
        let (path, text) = split_word(rest);
        if path.is_empty() {
            return Err(CommandParseError::MissingArgument {
                command: "write",
                argument: "path",
            });
        }
        Ok(ShellCommand::Write {
            path: path.to_string(),
            text: text.to_string(),
        })
    }
}

/// Splits off the first whitespace-delimited word
///
/// The remainder loses the single separator after the word but keeps any
/// further spacing.
fn split_word(input: &str) -> (&str, &str) {
    let input = input.trim_start();
    match input.find(char::is_whitespace) {
        Some(end) => {
            let rest = &input[end..];
            let mut chars = rest.chars();
            chars.next();
            (&input[..end], chars.as_str())
        }
        None => (input, ""),
    }
}
