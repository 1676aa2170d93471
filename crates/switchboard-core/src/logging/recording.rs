//! In-memory logger that keeps every entry

use parking_lot::Mutex;

use super::traits::Logger;

/// A single captured log line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    pub level: &'static str,
    pub message: String,
}

/// Logger that records entries instead of printing them
///
/// Useful in tests that assert on what was logged (for example that
/// provider failure detail reaches the log but not the user).
#[derive(Debug, Default)]
pub struct RecordingLogger {
    entries: Mutex<Vec<LogEntry>>,
}

impl RecordingLogger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything logged so far
    pub fn entries(&self) -> Vec<LogEntry> {
        self.entries.lock().clone()
    }

    /// Whether any entry at `level` contains `needle`
    pub fn contains(&self, level: &str, needle: &str) -> bool {
        self.entries
            .lock()
            .iter()
            .any(|e| e.level == level && e.message.contains(needle))
    }

    fn push(&self, level: &'static str, message: &str) {
        self.entries.lock().push(LogEntry {
            level,
            message: message.to_string(),
        });
    }
}

impl Logger for RecordingLogger {
    fn debug(&self, message: &str) {
        self.push("debug", message);
    }

    fn info(&self, message: &str) {
        self.push("info", message);
    }

    fn warn(&self, message: &str) {
        self.push("warn", message);
    }

    fn error(&self, message: &str) {
        self.push("error", message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::log_warn;

    #[test]
    fn test_recording_logger_captures_levels() {
        let logger = RecordingLogger::new();
        logger.info("router ready");
        log_warn!(logger, "attempt {} failed", 2);

        assert_eq!(logger.entries().len(), 2);
        assert!(logger.contains("info", "router ready"));
        assert!(logger.contains("warn", "attempt 2 failed"));
        assert!(!logger.contains("error", "attempt"));
    }
}
