//! # Logger Service
//!
//! This crate implements structured logging for the kernel and the host.
//!
//! ## Philosophy
//!
//! Logging is explicit and structured, not text-based or printf-style.
//! Components hand [`LogEntry`] values to a [`LogSink`] they were given;
//! nothing logs through global state. The namespace table itself never logs.

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::str::FromStr;
use thiserror::Error;

/// Log level
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Debug information
    Debug,
    /// Informational messages
    Info,
    /// Warnings
    Warn,
    /// Errors
    Error,
}

/// Unknown level name
#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown log level: {0}")]
pub struct ParseLevelError(String);

impl FromStr for LogLevel {
    type Err = ParseLevelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "debug" => Ok(LogLevel::Debug),
            "info" => Ok(LogLevel::Info),
            "warn" | "warning" => Ok(LogLevel::Warn),
            "error" => Ok(LogLevel::Error),
            _ => Err(ParseLevelError(s.to_string())),
        }
    }
}

/// A structured log entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    /// Log level
    pub level: LogLevel,
    /// Emitting component (if known)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    /// Log message
    pub message: String,
    /// Structured fields
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub fields: Vec<(String, String)>,
}

impl LogEntry {
    /// Creates a new log entry
    pub fn new(level: LogLevel, message: impl Into<String>) -> Self {
        Self {
            level,
            source: None,
            message: message.into(),
            fields: Vec::new(),
        }
    }

    pub fn debug(message: impl Into<String>) -> Self {
        Self::new(LogLevel::Debug, message)
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self::new(LogLevel::Info, message)
    }

    pub fn warn(message: impl Into<String>) -> Self {
        Self::new(LogLevel::Warn, message)
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(LogLevel::Error, message)
    }

    /// Sets the source component
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Adds a field to the log entry
    pub fn with_field(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.fields.push((key.into(), value.to_string()));
        self
    }

    /// Looks up a field by key
    pub fn field(&self, key: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Renders the entry as a single JSON line
    pub fn to_json_line(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// Destination for log entries
pub trait LogSink {
    fn log(&mut self, entry: LogEntry);
}

/// Sink that drops everything
#[derive(Debug, Default, Clone, Copy)]
pub struct NullLog;

impl LogSink for NullLog {
    fn log(&mut self, _entry: LogEntry) {}
}

/// Bounded in-memory log
///
/// Keeps the most recent entries at or above a minimum level.
#[derive(Debug, Clone)]
pub struct MemoryLog {
    min_level: LogLevel,
    capacity: usize,
    entries: VecDeque<LogEntry>,
    dropped: usize,
}

impl MemoryLog {
    pub fn new(min_level: LogLevel, capacity: usize) -> Self {
        Self {
            min_level,
            capacity: capacity.max(1),
            entries: VecDeque::new(),
            dropped: 0,
        }
    }

    pub fn entries(&self) -> impl Iterator<Item = &LogEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries evicted because the log was full
    pub fn dropped(&self) -> usize {
        self.dropped
    }

    /// Removes and returns every retained entry
    pub fn drain(&mut self) -> Vec<LogEntry> {
        self.entries.drain(..).collect()
    }
}

impl Default for MemoryLog {
    fn default() -> Self {
        Self::new(LogLevel::Debug, 1024)
    }
}

impl LogSink for MemoryLog {
    fn log(&mut self, entry: LogEntry) {
        if entry.level < self.min_level {
            return;
        }
        if self.entries.len() == self.capacity {
            self.entries.pop_front();
            self.dropped += 1;
        }
        self.entries.push_back(entry);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_level_ordering() {
        assert!(LogLevel::Debug < LogLevel::Info);
        assert!(LogLevel::Info < LogLevel::Warn);
        assert!(LogLevel::Warn < LogLevel::Error);
    }

    #[test]
    fn test_log_level_parsing() {
        assert_eq!("INFO".parse::<LogLevel>(), Ok(LogLevel::Info));
        assert_eq!("warning".parse::<LogLevel>(), Ok(LogLevel::Warn));
        assert!("loud".parse::<LogLevel>().is_err());
    }

    #[test]
    fn test_log_entry_creation() {
        let entry = LogEntry::new(LogLevel::Info, "test message");
        assert_eq!(entry.level, LogLevel::Info);
        assert_eq!(entry.message, "test message");
        assert!(entry.source.is_none());
        assert!(entry.fields.is_empty());
    }

    #[test]
    fn test_log_entry_with_fields() {
        let entry = LogEntry::info("saved")
            .with_source("storage")
            .with_field("entries", 3)
            .with_field("sector", 2048);

        assert_eq!(entry.source.as_deref(), Some("storage"));
        assert_eq!(entry.field("entries"), Some("3"));
        assert_eq!(entry.field("sector"), Some("2048"));
        assert_eq!(entry.field("missing"), None);
    }

    #[test]
    fn test_json_line() {
        let line = LogEntry::warn("disk missing")
            .with_field("path", "fox.img")
            .to_json_line()
            .unwrap();
        assert_eq!(
            line,
            r#"{"level":"warn","message":"disk missing","fields":[["path","fox.img"]]}"#
        );
    }

    #[test]
    fn test_memory_log_filters_by_level() {
        let mut log = MemoryLog::new(LogLevel::Info, 8);
        log.log(LogEntry::debug("noise"));
        log.log(LogEntry::info("boot"));
        assert_eq!(log.len(), 1);
        assert_eq!(log.entries().next().unwrap().message, "boot");
    }

    #[test]
    fn test_memory_log_evicts_oldest() {
        let mut log = MemoryLog::new(LogLevel::Debug, 2);
        log.log(LogEntry::info("one"));
        log.log(LogEntry::info("two"));
        log.log(LogEntry::info("three"));

        let messages: Vec<String> = log.drain().into_iter().map(|e| e.message).collect();
        assert_eq!(messages, vec!["two", "three"]);
        assert_eq!(log.dropped(), 1);
        assert!(log.is_empty());
    }
}
