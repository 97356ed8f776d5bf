//! Host output: the shell console on stdout, structured logs on stderr

use hal::ConsoleSink;
use services_logger::{LogEntry, LogLevel, LogSink};
use std::io::{self, Write};

/// ANSI clear screen and cursor home
const CLEAR_SCREEN: &str = "\x1b[2J\x1b[H";

/// Console sink writing to the process stdout
#[derive(Debug, Default, Clone, Copy)]
pub struct StdoutConsole;

impl ConsoleSink for StdoutConsole {
    fn put_char(&mut self, c: char) {
        let mut buf = [0u8; 4];
        self.write_str(c.encode_utf8(&mut buf));
    }

    fn write_str(&mut self, s: &str) {
        let mut stdout = io::stdout().lock();
        // A closed stdout has nowhere to report to
        let _ = stdout.write_all(s.as_bytes());
        let _ = stdout.flush();
    }

    fn clear(&mut self) {
        self.write_str(CLEAR_SCREEN);
    }
}

/// Log sink printing one JSON object per line to stderr
#[derive(Debug, Clone, Copy)]
pub struct StderrLog {
    min_level: LogLevel,
}

impl StderrLog {
    pub fn new(min_level: LogLevel) -> Self {
        Self { min_level }
    }
}

impl LogSink for StderrLog {
    fn log(&mut self, entry: LogEntry) {
        if entry.level < self.min_level {
            return;
        }
        match entry.to_json_line() {
            Ok(line) => eprintln!("{}", line),
            Err(_) => eprintln!("{:?}", entry),
        }
    }
}
