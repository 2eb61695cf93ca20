//! Event log for exports and row updates.
//!
//! An [`EventLog`] is created by the caller and passed by reference to every
//! operation that reports progress. Each entry is:
//!
//! - echoed to stderr (unless the log is silent),
//! - broadcast to subscribers (e.g. a front-end streaming progress),
//! - appended to `export_orders.log` in every directory attached with
//!   [`EventLog::attach_dir`].

use serde::{Deserialize, Serialize};
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tokio::sync::broadcast;

/// File name of the per-directory log.
pub const LOG_FILE_NAME: &str = "export_orders.log";

/// Log level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Info,
    Success,
    Warning,
    Error,
}

impl LogLevel {
    fn label(self) -> &'static str {
        match self {
            LogLevel::Info | LogLevel::Success => "INFO",
            LogLevel::Warning => "WARNING",
            LogLevel::Error => "ERROR",
        }
    }
}

/// A single log entry
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogEntry {
    pub level: LogLevel,
    pub message: String,
    /// Local time, `YYYY-MM-DD HH:MM:SS`
    pub timestamp: String,
}

impl LogEntry {
    pub fn new(level: LogLevel, message: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
            timestamp: chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
        }
    }

    /// Line written to the log file.
    pub fn to_line(&self) -> String {
        format!("{} - {} - {}", self.timestamp, self.level.label(), self.message)
    }
}

/// Injectable log sink shared by the exporters and the row mutator.
pub struct EventLog {
    sender: broadcast::Sender<LogEntry>,
    echo: bool,
    files: Mutex<Vec<(PathBuf, File)>>,
}

impl EventLog {
    /// Log that echoes every entry to stderr.
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(100);
        Self {
            sender,
            echo: true,
            files: Mutex::new(Vec::new()),
        }
    }

    /// Log that only broadcasts and writes attached files.
    pub fn silent() -> Self {
        Self {
            echo: false,
            ..Self::new()
        }
    }

    /// Append entries to `export_orders.log` inside `dir` from now on.
    ///
    /// Attaching the same directory twice is a no-op.
    pub fn attach_dir(&self, dir: impl AsRef<Path>) -> std::io::Result<PathBuf> {
        let path = dir.as_ref().join(LOG_FILE_NAME);
        let mut files = self.files.lock().unwrap_or_else(|e| e.into_inner());
        if files.iter().any(|(p, _)| *p == path) {
            return Ok(path);
        }
        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        files.push((path.clone(), file));
        Ok(path)
    }

    /// Files currently receiving entries.
    pub fn attached_files(&self) -> Vec<PathBuf> {
        let files = self.files.lock().unwrap_or_else(|e| e.into_inner());
        files.iter().map(|(p, _)| p.clone()).collect()
    }

    /// Record an entry
    pub fn log(&self, entry: LogEntry) {
        if self.echo {
            let prefix = match entry.level {
                LogLevel::Info => "   ",
                LogLevel::Success => "   ✓",
                LogLevel::Warning => "   ⚠️",
                LogLevel::Error => "   ❌",
            };
            eprintln!("{} {}", prefix, entry.message);
        }

        {
            let mut files = self.files.lock().unwrap_or_else(|e| e.into_inner());
            let line = entry.to_line();
            for (_, file) in files.iter_mut() {
                // A failing log destination must not abort the operation being logged.
                let _ = writeln!(file, "{}", line);
            }
        }

        let _ = self.sender.send(entry);
    }

    /// Get a receiver for streaming entries
    pub fn subscribe(&self) -> broadcast::Receiver<LogEntry> {
        self.sender.subscribe()
    }

    pub fn info(&self, msg: impl Into<String>) {
        self.log(LogEntry::new(LogLevel::Info, msg));
    }

    pub fn success(&self, msg: impl Into<String>) {
        self.log(LogEntry::new(LogLevel::Success, msg));
    }

    pub fn warning(&self, msg: impl Into<String>) {
        self.log(LogEntry::new(LogLevel::Warning, msg));
    }

    pub fn error(&self, msg: impl Into<String>) {
        self.log(LogEntry::new(LogLevel::Error, msg));
    }
}

impl Default for EventLog {
    fn default() -> Self {
        Self::new()
    }
}
