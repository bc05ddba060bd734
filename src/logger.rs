//! # Logger
//!
//! Traffic loggers for the control channel. The channel emits every command
//! it writes and every reply it reads to an attached [`FtpLogger`]; how and
//! where the log lines are persisted is up to the implementation.

use std::fmt;
use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::Path;
use std::sync::Mutex;

/// Severity attached to a logged control channel message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// A command sent to the server
    Command,
    /// A reply with code below 400
    Info,
    /// A reply with code 400 or above
    Error,
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogLevel::Command => write!(f, "COMMAND"),
            LogLevel::Info => write!(f, "INFO"),
            LogLevel::Error => write!(f, "ERROR"),
        }
    }
}

/// Describes an FTP traffic logger.
///
/// Logging is a side effect, not an error-reporting mechanism: failures are
/// always surfaced through return values, never through the log alone.
pub trait FtpLogger: Send + Sync {
    /// Record `message` with the given severity
    fn log(&self, level: LogLevel, message: &str);

    /// Record a reply with code below 400
    fn info(&self, message: &str) {
        self.log(LogLevel::Info, message);
    }

    /// Record a reply with code 400 or above
    fn error(&self, message: &str) {
        self.log(LogLevel::Error, message);
    }

    /// Record a command sent to the server
    fn command(&self, message: &str) {
        self.log(LogLevel::Command, message);
    }
}

/// In-memory logger collecting one `LEVEL message` entry per logged message.
#[derive(Debug, Default)]
pub struct ArrayLogger {
    logs: Mutex<Vec<String>>,
}

impl ArrayLogger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a snapshot of the collected log entries
    pub fn logs(&self) -> Vec<String> {
        self.logs.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// Number of collected entries
    pub fn count(&self) -> usize {
        self.logs.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    /// Discard all collected entries
    pub fn clear(&self) {
        self.logs.lock().unwrap_or_else(|e| e.into_inner()).clear();
    }
}

impl FtpLogger for ArrayLogger {
    fn log(&self, level: LogLevel, message: &str) {
        self.logs
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(format!("{level} {}", message.trim_end_matches(['\r', '\n'])));
    }
}

/// Logger writing `LEVEL message` lines to a file.
#[derive(Debug)]
pub struct FileLogger {
    file: Mutex<File>,
}

impl FileLogger {
    /// Open `path` for logging, truncating any previous content
    pub fn create<P: AsRef<Path>>(path: P) -> io::Result<Self> {
        File::create(path).map(|file| Self {
            file: Mutex::new(file),
        })
    }

    /// Open `path` for logging, appending to any previous content
    pub fn append<P: AsRef<Path>>(path: P) -> io::Result<Self> {
        OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map(|file| Self {
                file: Mutex::new(file),
            })
    }
}

impl FtpLogger for FileLogger {
    fn log(&self, level: LogLevel, message: &str) {
        let mut file = self.file.lock().unwrap_or_else(|e| e.into_inner());
        if let Err(err) = writeln!(file, "{level} {}", message.trim_end_matches(['\r', '\n'])) {
            error!("failed to write log entry: {err}");
        }
    }
}
