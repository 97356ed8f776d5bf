//! # Shell
//!
//! Executes [`ShellCommand`]s against a [`NamespaceTable`].
//!
//! The shell owns the current directory; the table only ever sees
//! absolute, normalized paths. This is also the only place where
//! [`FsError`] kinds become user-visible text.

use crate::commands::{CommandParseError, ShellCommand, ShellCommandParser};
use fs_table::{EntryKind, FsError, NamespaceTable, MAX_LISTING_LINE};
use hal::{ConsoleSink, ConsoleWriter};
use services_logger::{LogEntry, LogSink};
use std::fmt::Write;
use thiserror::Error;

/// Prompt printed before each line
pub const PROMPT: &str = "FoxOS> ";

/// Banner printed by `version`
pub const VERSION_BANNER: &str = "FoxOS v0.1";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ShellError {
    #[error(transparent)]
    Parse(#[from] CommandParseError),

    #[error("{command}: {path}: {}", fs_message(.source))]
    Fs {
        command: &'static str,
        path: String,
        source: FsError,
    },
}

/// What the caller should do after a line ran
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShellOutcome {
    Continue,
    /// Persist the table now
    Sync,
    Exit,
}

/// User-facing text for a namespace failure
pub fn fs_message(err: &FsError) -> &'static str {
    match err {
        FsError::NotFound => "No such file or directory",
        FsError::NotADirectory => "Not a directory",
        FsError::NotAFile => "Is a directory",
        FsError::AlreadyExists => "File exists",
        FsError::DirectoryNotEmpty => "Directory not empty",
        FsError::Full => "No space left in file table",
        FsError::InvalidName => "Invalid file name",
        FsError::InvalidKind => "Invalid entry kind",
        FsError::RootDirectory => "Cannot remove the root directory",
    }
}

#[derive(Debug, Clone)]
pub struct Shell {
    cwd: String,
}

impl Default for Shell {
    fn default() -> Self {
        Self::new()
    }
}

impl Shell {
    pub fn new() -> Self {
        Self {
            cwd: "/".to_string(),
        }
    }

    /// Current directory, always absolute and normalized
    pub fn cwd(&self) -> &str {
        &self.cwd
    }

    /// Turns a command argument into an absolute, normalized path
    ///
    /// `.` components are dropped and `..` removes the previous component;
    /// `..` at the root stays at the root.
    pub fn absolute_path(&self, arg: &str) -> String {
        let joined = if arg.starts_with('/') {
            arg.to_string()
        } else {
            format!("{}/{}", self.cwd, arg)
        };

        let mut parts: Vec<&str> = Vec::new();
        for component in joined.split('/') {
            match component {
                "" | "." => {}
                ".." => {
                    parts.pop();
                }
                name => parts.push(name),
            }
        }
        format!("/{}", parts.join("/"))
    }

    /// Runs one input line, printing results and errors to `console`
    pub fn execute(
        &mut self,
        table: &mut NamespaceTable,
        console: &mut dyn ConsoleSink,
        log: &mut dyn LogSink,
        line: &str,
    ) -> ShellOutcome {
        if line.trim().is_empty() {
            return ShellOutcome::Continue;
        }

        match self.run(table, console, line) {
            Ok(outcome) => outcome,
            Err(err) => {
                log.log(
                    LogEntry::debug("command failed")
                        .with_source("shell")
                        .with_field("line", line.trim())
                        .with_field("error", &err),
                );
                match &err {
                    ShellError::Parse(CommandParseError::UnknownCommand(_)) => {
                        console.write_str(&format!("{}\n", err));
                    }
                    _ => console.write_str(&format!("Error: {}\n", err)),
                }
                ShellOutcome::Continue
            }
        }
    }

    /// Parses and runs one line, returning failures instead of printing them
    pub fn run(
        &mut self,
        table: &mut NamespaceTable,
        console: &mut dyn ConsoleSink,
        line: &str,
    ) -> Result<ShellOutcome, ShellError> {
        let command = ShellCommandParser::parse(line)?;
        let name = command.name();
        let mut out = ConsoleWriter(console);

        // Console output cannot fail, so fmt results are ignored throughout
        match command {
            ShellCommand::Help => {
                let _ = writeln!(out, "Available commands:");
                for (command, help) in ShellCommand::HELP {
                    let _ = writeln!(out, "  {:<8} - {}", command, help);
                }
            }
            ShellCommand::Clear => out.0.clear(),
            ShellCommand::Version => {
                let _ = writeln!(out, "{}", VERSION_BANNER);
            }
            ShellCommand::Pwd => {
                let _ = writeln!(out, "{}", self.cwd);
            }
            ShellCommand::Ls { path } => {
                let path = self.absolute_path(path.as_deref().unwrap_or("."));
                let (summary, listing) = table
                    .stat(&path)
                    .and_then(|stat| {
                        let mut buf = vec![0u8; stat.child_count * MAX_LISTING_LINE];
                        let summary = table.list_directory_into(&path, &mut buf)?;
                        buf.truncate(summary.bytes_written);
                        Ok((summary, buf))
                    })
                    .map_err(|source| fs_error(name, &path, source))?;
                out.0.write_str(&String::from_utf8_lossy(&listing));
                if summary.truncated {
                    let _ = writeln!(out, "...");
                }
            }
            ShellCommand::Cd { path } => {
                let path = match path {
                    Some(arg) => self.absolute_path(&arg),
                    None => "/".to_string(),
                };
                let stat = table
                    .stat(&path)
                    .map_err(|source| fs_error(name, &path, source))?;
                if stat.kind != EntryKind::Directory {
                    return Err(fs_error(name, &path, FsError::NotADirectory));
                }
                self.cwd = path;
            }
            ShellCommand::Mkdir { path } => {
                let path = self.absolute_path(&path);
                table
                    .create_dir(&path)
                    .map_err(|source| fs_error(name, &path, source))?;
            }
            ShellCommand::Touch { path } => {
                let path = self.absolute_path(&path);
                table
                    .create_file(&path)
                    .map_err(|source| fs_error(name, &path, source))?;
            }
            ShellCommand::Rm { path } => {
                let path = self.absolute_path(&path);
                table
                    .delete_by_path(&path)
                    .map_err(|source| fs_error(name, &path, source))?;
                self.leave_removed_directory(table);
            }
            ShellCommand::Cat { path } => {
                let path = self.absolute_path(&path);
                let data = table
                    .read(&path, table.limits().max_file_size)
                    .map_err(|source| fs_error(name, &path, source))?;
                let text = String::from_utf8_lossy(&data);
                out.0.write_str(&text);
                if !text.is_empty() && !text.ends_with('\n') {
                    out.0.put_char('\n');
                }
            }
            ShellCommand::Write { path, text } => {
                let path = self.absolute_path(&path);
                let stored = table
                    .write(&path, text.as_bytes())
                    .map_err(|source| fs_error(name, &path, source))?;
                if stored < text.len() {
                    let _ = writeln!(
                        out,
                        "warning: file truncated to {} of {} bytes",
                        stored,
                        text.len()
                    );
                }
            }
            ShellCommand::Stat { path } => {
                let path = self.absolute_path(&path);
                let stat = table
                    .stat(&path)
                    .map_err(|source| fs_error(name, &path, source))?;
                let _ = writeln!(out, "  path: {}", path);
                let _ = writeln!(out, "  kind: {}", stat.kind);
                let _ = writeln!(out, " index: {}", stat.index);
                let _ = writeln!(out, "parent: {}", stat.parent);
                match stat.kind {
                    EntryKind::Directory => {
                        let _ = writeln!(out, "  size: {} entries", stat.child_count);
                    }
                    _ => {
                        let _ = writeln!(out, "  size: {} bytes", stat.size);
                    }
                }
            }
            ShellCommand::Sync => return Ok(ShellOutcome::Sync),
            ShellCommand::Exit => {
                let _ = writeln!(out, "Exiting FoxOS...");
                return Ok(ShellOutcome::Exit);
            }
        }

        Ok(ShellOutcome::Continue)
    }

    /// Moves up until the current directory exists again
    fn leave_removed_directory(&mut self, table: &NamespaceTable) {
        while !table.exists(&self.cwd) {
            self.cwd = self.absolute_path("..");
        }
    }
}

fn fs_error(command: &'static str, path: &str, source: FsError) -> ShellError {
    ShellError::Fs {
        command,
        path: path.to_string(),
        source,
    }
}
