//! Diagnostic sinks
//!
//! Every component that can emit a warning takes a `&dyn DiagnosticSink`
//! instead of reaching for a global logger, so tests can assert on the exact
//! messages a report run produced.

use log::Level;
use std::cell::RefCell;

/// A single recorded diagnostic
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub level: Level,
    pub message: String,
}

/// Receiver for warnings and debug output produced during a report pass
pub trait DiagnosticSink {
    fn record(&self, level: Level, message: &str);

    fn error(&self, message: &str) {
        self.record(Level::Error, message);
    }

    fn warn(&self, message: &str) {
        self.record(Level::Warn, message);
    }

    fn info(&self, message: &str) {
        self.record(Level::Info, message);
    }

    fn debug(&self, message: &str) {
        self.record(Level::Debug, message);
    }
}

/// Forwards diagnostics to the `log` facade
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

impl DiagnosticSink for LogSink {
    fn record(&self, level: Level, message: &str) {
        log::log!(target: "looper_report", level, "{}", message);
    }
}

/// Keeps every diagnostic in memory
#[derive(Debug, Default)]
pub struct MemorySink {
    entries: RefCell<Vec<Diagnostic>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> Vec<Diagnostic> {
        self.entries.borrow().clone()
    }

    /// Messages recorded at exactly `level`
    pub fn messages(&self, level: Level) -> Vec<String> {
        self.entries
            .borrow()
            .iter()
            .filter(|d| d.level == level)
            .map(|d| d.message.clone())
            .collect()
    }

    pub fn warnings(&self) -> Vec<String> {
        self.messages(Level::Warn)
    }

    pub fn clear(&self) {
        self.entries.borrow_mut().clear();
    }
}

impl DiagnosticSink for MemorySink {
    fn record(&self, level: Level, message: &str) {
        self.entries.borrow_mut().push(Diagnostic {
            level,
            message: message.to_string(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_sink_filters_by_level() {
        let sink = MemorySink::new();
        sink.warn("first");
        sink.debug("noise");
        sink.warn("second");

        assert_eq!(sink.warnings(), vec!["first", "second"]);
        assert_eq!(sink.messages(Level::Debug), vec!["noise"]);
        assert_eq!(sink.entries().len(), 3);

        sink.clear();
        assert!(sink.entries().is_empty());
    }
}
