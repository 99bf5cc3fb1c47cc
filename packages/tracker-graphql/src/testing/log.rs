use crate::log::ConnectionLog;
use std::sync::Mutex;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LogLevel {
    Warn,
    Error,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LogEntry {
    pub level: LogLevel,
    pub connection: String,
    pub message: String,
}

/// Keeps every line it is given.
#[derive(Debug, Default)]
pub struct RecordingLog {
    entries: Mutex<Vec<LogEntry>>,
}

impl RecordingLog {
    pub fn entries(&self) -> Vec<LogEntry> {
        self.entries
            .lock()
            .map(|entries| entries.clone())
            .unwrap_or_default()
    }

    pub fn messages(&self, level: LogLevel) -> Vec<String> {
        self.entries()
            .into_iter()
            .filter(|entry| entry.level == level)
            .map(|entry| entry.message)
            .collect()
    }

    fn push(&self, level: LogLevel, connection: &str, message: &str) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.push(LogEntry {
                level,
                connection: connection.to_string(),
                message: message.to_string(),
            });
        }
    }
}

impl ConnectionLog for RecordingLog {
    fn warn(&self, connection: &str, message: &str) {
        self.push(LogLevel::Warn, connection, message);
    }

    fn error(&self, connection: &str, message: &str) {
        self.push(LogLevel::Error, connection, message);
    }
}
