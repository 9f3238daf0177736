//! Progress and warning lines for the caller.
//!
//! The pipeline never prints. It hands [`LogEntry`] values to a [`LogSink`]
//! chosen by the caller: a closure, a [`MemorySink`] for tests, or a
//! [`LogBroadcaster`] that fans entries out to any number of receivers
//! (the CLI prints them from another task while a conversion runs).

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Mutex;
use tokio::sync::broadcast;

/// Log level for display
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Info,
    Success,
    Warning,
    Error,
}

/// A single log entry
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogEntry {
    /// Log level
    pub level: LogLevel,
    /// Log message
    pub message: String,
    /// Optional indentation level (for nested logs)
    #[serde(default)]
    pub indent: u8,
    /// When the entry was created
    pub timestamp: DateTime<Local>,
}

impl LogEntry {
    fn new(level: LogLevel, message: impl Into<String>) -> Self {
        Self { level, message: message.into(), indent: 0, timestamp: Local::now() }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self::new(LogLevel::Info, message)
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self::new(LogLevel::Success, message)
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(LogLevel::Warning, message)
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(LogLevel::Error, message)
    }

    pub fn with_indent(mut self, indent: u8) -> Self {
        self.indent = indent;
        self
    }
}

impl fmt::Display for LogEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let prefix = match self.level {
            LogLevel::Info => ">>",
            LogLevel::Success => "OK",
            LogLevel::Warning => "WARNING |",
            LogLevel::Error => "ERROR |",
        };
        let indent = "   ".repeat(self.indent as usize);
        write!(f, "{}{} {}", indent, prefix, self.message)
    }
}

/// Receives log entries from a conversion.
pub trait LogSink: Send + Sync {
    fn log(&self, entry: LogEntry);
}

impl dyn LogSink + '_ {
    pub fn info(&self, msg: impl Into<String>) {
        self.log(LogEntry::info(msg));
    }

    pub fn success(&self, msg: impl Into<String>) {
        self.log(LogEntry::success(msg));
    }

    pub fn warning(&self, msg: impl Into<String>) {
        self.log(LogEntry::warning(msg));
    }

    pub fn error(&self, msg: impl Into<String>) {
        self.log(LogEntry::error(msg));
    }

    pub fn info_indent(&self, msg: impl Into<String>, indent: u8) {
        self.log(LogEntry::info(msg).with_indent(indent));
    }
}

impl<F> LogSink for F
where
    F: Fn(LogEntry) + Send + Sync,
{
    fn log(&self, entry: LogEntry) {
        self(entry)
    }
}

/// Discards everything.
pub struct NullSink;

impl LogSink for NullSink {
    fn log(&self, _entry: LogEntry) {}
}

/// Keeps every entry in memory.
#[derive(Default)]
pub struct MemorySink {
    entries: Mutex<Vec<LogEntry>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> Vec<LogEntry> {
        self.entries.lock().map(|e| e.clone()).unwrap_or_default()
    }

    pub fn messages(&self) -> Vec<String> {
        self.entries().into_iter().map(|e| e.message).collect()
    }

    pub fn warnings(&self) -> Vec<String> {
        self.entries()
            .into_iter()
            .filter(|e| e.level == LogLevel::Warning)
            .map(|e| e.message)
            .collect()
    }
}

impl LogSink for MemorySink {
    fn log(&self, entry: LogEntry) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.push(entry);
        }
    }
}

/// Broadcasts log entries to all subscribers
pub struct LogBroadcaster {
    sender: broadcast::Sender<LogEntry>,
}

impl LogBroadcaster {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(256);
        Self { sender }
    }

    /// Get a receiver; it sees entries logged after this call
    pub fn subscribe(&self) -> broadcast::Receiver<LogEntry> {
        self.sender.subscribe()
    }
}

impl Default for LogBroadcaster {
    fn default() -> Self {
        Self::new()
    }
}

impl LogSink for LogBroadcaster {
    fn log(&self, entry: LogEntry) {
        // No receivers is fine
        let _ = self.sender.send(entry);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_memory_sink_collects_in_order() {
        let sink = MemorySink::new();
        let dyn_sink: &dyn LogSink = &sink;
        dyn_sink.info("File read: kayit.csv");
        dyn_sink.warning("No sex column found");
        dyn_sink.success("Done");

        assert_eq!(sink.messages(), vec!["File read: kayit.csv", "No sex column found", "Done"]);
        assert_eq!(sink.warnings(), vec!["No sex column found"]);
    }

    #[test]
    fn test_closure_sink() {
        let lines = Arc::new(Mutex::new(Vec::new()));
        let captured = Arc::clone(&lines);
        let sink = move |entry: LogEntry| captured.lock().unwrap().push(entry.to_string());

        let dyn_sink: &dyn LogSink = &sink;
        dyn_sink.warning("check the sexes");
        dyn_sink.info_indent("Kulüp → club", 1);

        let lines = lines.lock().unwrap();
        assert_eq!(lines[0], "WARNING | check the sexes");
        assert_eq!(lines[1], "   >> Kulüp → club");
    }

    #[test]
    fn test_broadcaster_delivers_to_subscribers() {
        let broadcaster = LogBroadcaster::new();
        broadcaster.log(LogEntry::info("before subscribe"));

        let mut rx = broadcaster.subscribe();
        broadcaster.log(LogEntry::success("after subscribe"));

        let entry = rx.try_recv().unwrap();
        assert_eq!(entry.message, "after subscribe");
        assert_eq!(entry.level, LogLevel::Success);
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_entry_serializes_camel_case() {
        let json = serde_json::to_value(LogEntry::warning("x").with_indent(2)).unwrap();
        assert_eq!(json["level"], "warning");
        assert_eq!(json["indent"], 2);
        assert!(json.get("timestamp").is_some());
    }
}
