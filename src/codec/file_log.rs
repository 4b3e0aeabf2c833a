use std::fmt;

use serde::Serialize;

/// Severity of a file log entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogCategory {
    /// The operation failed
    Error,
    /// Something was off but the operation continued
    Warning,
}

impl LogCategory {
    /// Name of the category (`"error"` or `"warning"`)
    pub fn as_str(&self) -> &'static str {
        match self {
            LogCategory::Error => "error",
            LogCategory::Warning => "warning",
        }
    }
}

impl fmt::Display for LogCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One diagnostic recorded during a load or save
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LogEntry {
    /// Severity
    pub category: LogCategory,
    /// Human-readable explanation
    pub message: String,
}

/// Diagnostics accumulated by a single load or save call.
///
/// Cleared at the start of every call. Each entry is also forwarded to the
/// `log` facade so it shows up in the application log.
#[derive(Debug, Clone, Default, Serialize)]
pub struct FileLog {
    entries: Vec<LogEntry>,
}

impl FileLog {
    /// Create an empty log
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an error
    pub fn error(&mut self, message: impl Into<String>) {
        let message = message.into();
        log::error!("{}", message);
        self.entries.push(LogEntry {
            category: LogCategory::Error,
            message,
        });
    }

    /// Record a warning
    pub fn warning(&mut self, message: impl Into<String>) {
        let message = message.into();
        log::warn!("{}", message);
        self.entries.push(LogEntry {
            category: LogCategory::Warning,
            message,
        });
    }

    /// Remove every entry
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Entries in the order they were recorded
    pub fn entries(&self) -> &[LogEntry] {
        &self.entries
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if nothing was recorded
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns true if at least one error was recorded
    pub fn has_errors(&self) -> bool {
        self.errors().next().is_some()
    }

    /// Iterate over error messages
    pub fn errors(&self) -> impl Iterator<Item = &str> {
        self.messages(LogCategory::Error)
    }

    /// Iterate over warning messages
    pub fn warnings(&self) -> impl Iterator<Item = &str> {
        self.messages(LogCategory::Warning)
    }

    fn messages(&self, category: LogCategory) -> impl Iterator<Item = &str> {
        self.entries
            .iter()
            .filter(move |e| e.category == category)
            .map(|e| e.message.as_str())
    }
}
