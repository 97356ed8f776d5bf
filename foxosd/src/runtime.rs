//! # Host Runtime
//!
//! Boots the namespace table, restores it from the disk image and runs the
//! shell loop over scripted or line input.

use crate::disk::FileDisk;
use crate::input_script::{InputScript, InputScriptError};
use crate::output::StderrLog;
use cli_console::{EditKey, LineEditor, Shell, ShellOutcome, PROMPT};
use fs_table::{Limits, LimitsError, NamespaceTable};
use hal::ConsoleSink;
use serde::{Deserialize, Serialize};
use services_logger::{LogEntry, LogLevel, LogSink};
use services_storage::{SaveReport, StorageError, TableStore};
use std::io::{self, BufRead};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum HostRuntimeError {
    #[error("Script error: {0}")]
    Script(#[from] InputScriptError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Cannot open disk image {path}: {source}")]
    Disk {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Config error: {0}")]
    Config(String),

    #[error("Invalid table limits: {0}")]
    Limits(#[from] LimitsError),

    #[error("Input error: {0}")]
    Input(#[from] io::Error),
}

/// Host runtime configuration
///
/// Loadable from a JSON file; any field left out keeps its default.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HostRuntimeConfig {
    /// Input script text; stdin lines are read when absent
    #[serde(skip)]
    pub script: Option<String>,
    /// Disk image holding the table; the table lives in memory only when absent
    pub disk: Option<PathBuf>,
    /// Sectors to allocate for a new image (0 = enough for `limits`)
    pub disk_sectors: u64,
    /// Save after every command that changed the table
    pub autosave: bool,
    /// Lowest level printed to stderr
    pub log_level: LogLevel,
    /// Maximum command lines to run (0 = unlimited)
    pub max_lines: usize,
    /// Table capacity
    pub limits: Limits,
}

impl Default for HostRuntimeConfig {
    fn default() -> Self {
        Self {
            script: None,
            disk: None,
            disk_sectors: 0,
            autosave: true,
            log_level: LogLevel::Info,
            max_lines: 0,
            limits: Limits::default(),
        }
    }
}

impl HostRuntimeConfig {
    /// Parses and validates a JSON config
    pub fn from_json(text: &str) -> Result<Self, HostRuntimeError> {
        let config: Self =
            serde_json::from_str(text).map_err(|e| HostRuntimeError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, HostRuntimeError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| HostRuntimeError::Config(format!("{}: {}", path.display(), e)))?;
        Self::from_json(&text)
    }

    pub fn validate(&self) -> Result<(), HostRuntimeError> {
        self.limits.validate()?;
        Ok(())
    }
}

/// What a run did
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Command lines executed
    pub lines: usize,
    /// Successful saves to the disk image
    pub saves: usize,
    /// True if the shell asked to exit
    pub exited: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum HostState {
    Running,
    Shutdown,
}

/// Host runtime
pub struct HostRuntime<L: LogSink = StderrLog> {
    config: HostRuntimeConfig,
    table: NamespaceTable,
    store: Option<TableStore<FileDisk>>,
    shell: Shell,
    editor: LineEditor,
    log: L,
    state: HostState,
    /// Table revision last written to disk
    saved_revision: u64,
    summary: RunSummary,
}

impl HostRuntime<StderrLog> {
    pub fn new(config: HostRuntimeConfig) -> Result<Self, HostRuntimeError> {
        let log = StderrLog::new(config.log_level);
        Self::with_log(config, log)
    }
}

impl<L: LogSink> HostRuntime<L> {
    /// Boots with an explicit log sink
    ///
    /// A blank image is formatted; an existing one is loaded and fully
    /// validated. A damaged image stops the boot rather than being
    /// overwritten.
    pub fn with_log(config: HostRuntimeConfig, mut log: L) -> Result<Self, HostRuntimeError> {
        config.validate()?;
        let mut table = NamespaceTable::new(config.limits);
        table.init();
        let limits = table.limits();

        let store = match &config.disk {
            Some(path) => {
                let sectors = match config.disk_sectors {
                    0 => TableStore::<FileDisk>::required_sectors(limits),
                    n => n,
                };
                let disk = FileDisk::open(path, sectors).map_err(|source| {
                    HostRuntimeError::Disk {
                        path: path.clone(),
                        source,
                    }
                })?;
                let mut store = TableStore::new(disk);

                if store.is_formatted()? {
                    table = store.load(limits)?;
                    log.log(
                        LogEntry::info("table loaded")
                            .with_source("foxosd")
                            .with_field("disk", path.display())
                            .with_field("entries", table.live_count()),
                    );
                } else {
                    let report = store.save(&table)?;
                    log.log(
                        LogEntry::info("disk formatted")
                            .with_source("foxosd")
                            .with_field("disk", path.display())
                            .with_field("sectors", report.sectors),
                    );
                }
                Some(store)
            }
            None => {
                log.log(
                    LogEntry::warn("no disk image, changes will not persist").with_source("foxosd"),
                );
                None
            }
        };

        log.log(
            LogEntry::info("boot complete")
                .with_source("foxosd")
                .with_field("capacity", table.capacity())
                .with_field("max_file_size", limits.max_file_size),
        );

        Ok(Self {
            saved_revision: table.revision(),
            config,
            table,
            store,
            shell: Shell::new(),
            editor: LineEditor::new(),
            log,
            state: HostState::Running,
            summary: RunSummary::default(),
        })
    }

    pub fn table(&self) -> &NamespaceTable {
        &self.table
    }

    pub fn shell(&self) -> &Shell {
        &self.shell
    }

    pub fn log(&self) -> &L {
        &self.log
    }

    /// Returns true if the table changed since the last save
    pub fn is_dirty(&self) -> bool {
        self.table.revision() != self.saved_revision
    }

    /// Runs the configured script, or stdin lines when there is none
    pub fn run(&mut self, console: &mut dyn ConsoleSink) -> Result<RunSummary, HostRuntimeError> {
        match self.config.script.clone() {
            Some(text) => {
                let script = InputScript::from_text(&text)?;
                self.run_script(script, console)
            }
            None => {
                let stdin = io::stdin();
                self.run_lines(stdin.lock(), console)
            }
        }
    }

    /// Feeds scripted keys until the script ends or the shell exits
    pub fn run_script(
        &mut self,
        mut script: InputScript,
        console: &mut dyn ConsoleSink,
    ) -> Result<RunSummary, HostRuntimeError> {
        while self.should_continue() {
            let Some(key) = script.next_input() else {
                break;
            };
            self.handle_key(key, console)?;
        }
        self.shutdown()
    }

    /// Runs each input line as one command
    pub fn run_lines<R: BufRead>(
        &mut self,
        reader: R,
        console: &mut dyn ConsoleSink,
    ) -> Result<RunSummary, HostRuntimeError> {
        let mut lines = reader.lines();
        while self.should_continue() {
            console.write_str(PROMPT);
            let Some(line) = lines.next() else {
                console.put_char('\n');
                break;
            };
            let line = line?;
            // Same path as typed keys, so the line length bound applies
            self.editor.clear();
            self.editor.type_str(&line);
            if let Some(line) = self.editor.handle_key(EditKey::Enter) {
                self.execute_line(&line, console);
            }
        }
        self.shutdown()
    }

    fn should_continue(&self) -> bool {
        if self.state == HostState::Shutdown {
            return false;
        }
        self.config.max_lines == 0 || self.summary.lines < self.config.max_lines
    }

    fn handle_key(
        &mut self,
        key: EditKey,
        console: &mut dyn ConsoleSink,
    ) -> Result<(), HostRuntimeError> {
        if let Some(line) = self.editor.handle_key(key) {
            // Echo the finished line as it would have appeared on screen
            console.write_str(PROMPT);
            console.write_str(&line);
            console.put_char('\n');
            self.execute_line(&line, console);
        }
        Ok(())
    }

    /// Runs one command line
    ///
    /// Save failures are reported on the console and leave the table dirty,
    /// so a later command or `sync` retries.
    fn execute_line(&mut self, line: &str, console: &mut dyn ConsoleSink) {
        self.summary.lines += 1;
        let outcome = self
            .shell
            .execute(&mut self.table, console, &mut self.log, line);

        match outcome {
            ShellOutcome::Continue => {
                if self.config.autosave && self.is_dirty() {
                    if let Err(err) = self.save() {
                        console.write_str(&format!("Error: autosave failed: {}\n", err));
                    }
                }
            }
            ShellOutcome::Sync => match self.save() {
                Ok(Some(report)) => console.write_str(&format!(
                    "Saved {} entries ({} bytes)\n",
                    report.entries, report.payload_len
                )),
                Ok(None) => console.write_str("No disk attached\n"),
                Err(err) => console.write_str(&format!("Error: sync: {}\n", err)),
            },
            ShellOutcome::Exit => {
                self.summary.exited = true;
                self.state = HostState::Shutdown;
            }
        }
    }

    /// Writes the table to the disk image, if there is one
    fn save(&mut self) -> Result<Option<SaveReport>, StorageError> {
        let Some(store) = self.store.as_mut() else {
            return Ok(None);
        };

        match store.save(&self.table) {
            Ok(report) => {
                self.saved_revision = self.table.revision();
                self.summary.saves += 1;
                self.log.log(
                    LogEntry::debug("table saved")
                        .with_source("foxosd")
                        .with_field("entries", report.entries)
                        .with_field("bytes", report.payload_len)
                        .with_field("revision", self.saved_revision),
                );
                Ok(Some(report))
            }
            Err(err) => {
                self.log.log(
                    LogEntry::error("save failed")
                        .with_source("foxosd")
                        .with_field("error", &err),
                );
                Err(err)
            }
        }
    }

    /// Makes a last save attempt, then reports the session
    ///
    /// A failed final save is returned as an error after the shutdown entry
    /// is logged.
    fn shutdown(&mut self) -> Result<RunSummary, HostRuntimeError> {
        self.state = HostState::Shutdown;
        let saved = if self.config.autosave && self.is_dirty() {
            self.save().map(|_| ())
        } else {
            Ok(())
        };
        self.log.log(
            LogEntry::info("shutdown")
                .with_source("foxosd")
                .with_field("lines", self.summary.lines)
                .with_field("saves", self.summary.saves)
                .with_field("unsaved", self.is_dirty()),
        );
        saved?;
        Ok(self.summary)
    }
}
