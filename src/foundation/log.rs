use std::cell::RefCell;

/// Severity of a diagnostic emitted while building a document.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LogLevel {
    /// Recoverable issue; the affected value falls back to its default.
    Warning,
    /// A property or sub-tree failed to bind.
    Error,
}

/// Diagnostic sink injected into the document builder.
///
/// `json` carries the offending JSON fragment when one is available.
pub trait Logger {
    fn log(&self, level: LogLevel, message: &str, json: Option<&str>);
}

/// Default sink forwarding to `tracing`.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingLogger;

impl Logger for TracingLogger {
    fn log(&self, level: LogLevel, message: &str, json: Option<&str>) {
        match level {
            LogLevel::Warning => tracing::warn!(json = json.unwrap_or(""), "{message}"),
            LogLevel::Error => tracing::error!(json = json.unwrap_or(""), "{message}"),
        }
    }
}

/// Sink that keeps every diagnostic in memory, for embedders that surface them later.
#[derive(Debug, Default)]
pub struct RecordingLogger {
    entries: RefCell<Vec<(LogLevel, String)>>,
}

impl RecordingLogger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> Vec<(LogLevel, String)> {
        self.entries.borrow().clone()
    }

    pub fn count(&self, level: LogLevel) -> usize {
        self.entries
            .borrow()
            .iter()
            .filter(|(l, _)| *l == level)
            .count()
    }

    pub fn contains(&self, needle: &str) -> bool {
        self.entries.borrow().iter().any(|(_, m)| m.contains(needle))
    }
}

impl Logger for RecordingLogger {
    fn log(&self, level: LogLevel, message: &str, _json: Option<&str>) {
        self.entries.borrow_mut().push((level, message.to_owned()));
    }
}

/// Forward a diagnostic, attaching a compact rendering of `json`.
pub(crate) fn report(
    logger: &dyn Logger,
    level: LogLevel,
    message: &str,
    json: Option<&serde_json::Value>,
) {
    let rendered = json.map(|v| v.to_string());
    logger.log(level, message, rendered.as_deref());
}
