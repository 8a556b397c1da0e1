//! Per-plugin logger.
//!
//! A [`PluginLogger`] is created once when a plugin is initialized and kept
//! for the plugin's lifetime. It prefixes every line with the plugin's log
//! prefix and forwards it to a [`LogSink`]. The default sink is
//! [`TracingSink`], which emits `tracing` events.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

/// Log severity, most severe first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// System is unusable.
    Emergency,
    /// Action must be taken immediately.
    Alert,
    /// Critical conditions.
    Critical,
    /// Error conditions.
    Error,
    /// Warning conditions.
    Warning,
    /// Normal but significant.
    Notice,
    /// Informational.
    Info,
    /// Debug-level detail.
    Debug,
}

impl LogLevel {
    /// Lowercase name of the level.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Emergency => "emergency",
            Self::Alert => "alert",
            Self::Critical => "critical",
            Self::Error => "error",
            Self::Warning => "warning",
            Self::Notice => "notice",
            Self::Info => "info",
            Self::Debug => "debug",
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Destination for plugin log lines.
pub trait LogSink: Send + Sync {
    /// Record one message. `prefix` is the plugin's log prefix without
    /// decoration.
    fn log(&self, level: LogLevel, prefix: &str, message: &str);
}

/// Sink that forwards to the `tracing` subscriber.
///
/// The first three levels map to `ERROR`, `Warning` to `WARN`, `Notice` and
/// `Info` to `INFO`. The original level is kept in the `severity` field.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl LogSink for TracingSink {
    fn log(&self, level: LogLevel, prefix: &str, message: &str) {
        let severity = level.as_str();
        match level {
            LogLevel::Emergency | LogLevel::Alert | LogLevel::Critical | LogLevel::Error => {
                tracing::error!(plugin = prefix, severity, "{message}");
            },
            LogLevel::Warning => tracing::warn!(plugin = prefix, severity, "{message}"),
            LogLevel::Notice | LogLevel::Info => {
                tracing::info!(plugin = prefix, severity, "{message}");
            },
            LogLevel::Debug => tracing::debug!(plugin = prefix, severity, "{message}"),
        }
    }
}

/// Logger bound to one plugin.
#[derive(Clone)]
pub struct PluginLogger {
    prefix: String,
    sink: Arc<dyn LogSink>,
}

impl fmt::Debug for PluginLogger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PluginLogger")
            .field("prefix", &self.prefix)
            .finish_non_exhaustive()
    }
}

impl PluginLogger {
    /// Create a logger with the given prefix and sink.
    #[must_use]
    pub fn new(prefix: impl Into<String>, sink: Arc<dyn LogSink>) -> Self {
        Self {
            prefix: prefix.into(),
            sink,
        }
    }

    /// Create a logger that writes to [`TracingSink`].
    #[must_use]
    pub fn tracing(prefix: impl Into<String>) -> Self {
        Self::new(prefix, Arc::new(TracingSink))
    }

    /// The plugin's log prefix.
    #[must_use]
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Record a message at `level`.
    pub fn log(&self, level: LogLevel, message: impl AsRef<str>) {
        self.sink.log(level, &self.prefix, message.as_ref());
    }

    /// Log at emergency severity.
    pub fn emergency(&self, message: impl AsRef<str>) {
        self.log(LogLevel::Emergency, message);
    }

    /// Log at alert severity.
    pub fn alert(&self, message: impl AsRef<str>) {
        self.log(LogLevel::Alert, message);
    }

    /// Log at critical severity.
    pub fn critical(&self, message: impl AsRef<str>) {
        self.log(LogLevel::Critical, message);
    }

    /// Log at error severity.
    pub fn error(&self, message: impl AsRef<str>) {
        self.log(LogLevel::Error, message);
    }

    /// Log at warning severity.
    pub fn warning(&self, message: impl AsRef<str>) {
        self.log(LogLevel::Warning, message);
    }

    /// Log at notice severity.
    pub fn notice(&self, message: impl AsRef<str>) {
        self.log(LogLevel::Notice, message);
    }

    /// Log at info severity.
    pub fn info(&self, message: impl AsRef<str>) {
        self.log(LogLevel::Info, message);
    }

    /// Log at debug severity.
    pub fn debug(&self, message: impl AsRef<str>) {
        self.log(LogLevel::Debug, message);
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;

    #[derive(Default)]
    struct Capture(Mutex<Vec<(LogLevel, String, String)>>);

    impl LogSink for Capture {
        fn log(&self, level: LogLevel, prefix: &str, message: &str) {
            self.0
                .lock()
                .unwrap()
                .push((level, prefix.to_owned(), message.to_owned()));
        }
    }

    #[test]
    fn forwards_level_prefix_and_message() {
        let sink = Arc::new(Capture::default());
        let logger = PluginLogger::new("Greeter", sink.clone());
        logger.critical("disk on fire");
        logger.info("hello");

        let lines = sink.0.lock().unwrap();
        assert_eq!(
            lines[0],
            (LogLevel::Critical, "Greeter".into(), "disk on fire".into())
        );
        assert_eq!(lines[1].0, LogLevel::Info);
    }

    #[test]
    fn clones_share_sink() {
        let sink = Arc::new(Capture::default());
        let logger = PluginLogger::new("Greeter", sink.clone());
        let copy = logger.clone();
        logger.warning("a");
        copy.debug("b");
        assert_eq!(sink.0.lock().unwrap().len(), 2);
    }

    #[test]
    fn level_ordering_is_most_severe_first() {
        assert!(LogLevel::Emergency < LogLevel::Critical);
        assert!(LogLevel::Critical < LogLevel::Debug);
        assert_eq!(LogLevel::Critical.to_string(), "critical");
    }

    #[test]
    fn tracing_sink_does_not_panic_without_subscriber() {
        let logger = PluginLogger::tracing("Greeter");
        logger.emergency("e");
        logger.alert("a");
        logger.error("x");
        logger.notice("n");
        assert_eq!(logger.prefix(), "Greeter");
    }
}
