//! Mock collaborators for plugin tests.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tessel_plugins::{
    CommandMap, CommandSender, HostContext, LogLevel, LogSink, PluginCommand, PluginDescription,
    PluginLogger,
};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// One captured log line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogRecord {
    /// Severity.
    pub level: LogLevel,
    /// Plugin log prefix.
    pub prefix: String,
    /// Message text.
    pub message: String,
}

/// A [`LogSink`] that keeps every line in memory.
#[derive(Debug, Default)]
pub struct RecordingSink {
    records: Mutex<Vec<LogRecord>>,
}

impl RecordingSink {
    /// Create an empty sink.
    #[must_use]
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// A logger writing into `sink`.
    #[must_use]
    pub fn logger(sink: &Arc<Self>, prefix: impl Into<String>) -> PluginLogger {
        PluginLogger::new(prefix, Arc::clone(sink) as Arc<dyn LogSink>)
    }

    /// Every captured line, oldest first.
    #[must_use]
    pub fn records(&self) -> Vec<LogRecord> {
        lock(&self.records).clone()
    }

    /// Messages captured at `level`.
    #[must_use]
    pub fn messages_at(&self, level: LogLevel) -> Vec<String> {
        lock(&self.records)
            .iter()
            .filter(|r| r.level == level)
            .map(|r| r.message.clone())
            .collect()
    }

    /// Whether a line at `level` contains `needle`.
    #[must_use]
    pub fn contains(&self, level: LogLevel, needle: &str) -> bool {
        lock(&self.records)
            .iter()
            .any(|r| r.level == level && r.message.contains(needle))
    }

    /// Drop all captured lines.
    pub fn clear(&self) {
        lock(&self.records).clear();
    }
}

impl LogSink for RecordingSink {
    fn log(&self, level: LogLevel, prefix: &str, message: &str) {
        lock(&self.records).push(LogRecord {
            level,
            prefix: prefix.to_owned(),
            message: message.to_owned(),
        });
    }
}

/// A [`HostContext`] with an in-memory command map and a recording logger.
#[derive(Debug)]
pub struct MockHost {
    commands: Mutex<CommandMap>,
    sink: Arc<RecordingSink>,
}

impl Default for MockHost {
    fn default() -> Self {
        Self::new()
    }
}

impl MockHost {
    /// Create a host with no commands.
    #[must_use]
    pub fn new() -> Self {
        Self {
            commands: Mutex::new(CommandMap::new()),
            sink: RecordingSink::new(),
        }
    }

    /// Register a command under its bare name (if free) and
    /// `<prefix>:<name>`. Returns whether the bare name was bound.
    pub fn register_command(&self, prefix: &str, command: PluginCommand) -> bool {
        lock(&self.commands).register(prefix, command)
    }

    /// The sink every plugin logger created by this host writes to.
    #[must_use]
    pub fn sink(&self) -> &Arc<RecordingSink> {
        &self.sink
    }
}

impl HostContext for MockHost {
    fn plugin_command(&self, label: &str) -> Option<Arc<PluginCommand>> {
        lock(&self.commands).get(label)
    }

    fn create_logger(&self, description: &PluginDescription) -> PluginLogger {
        RecordingSink::logger(&self.sink, description.log_prefix())
    }
}

/// A [`CommandSender`] that records the messages sent to it.
#[derive(Debug)]
pub struct MockSender {
    name: String,
    messages: Mutex<Vec<String>>,
}

impl MockSender {
    /// Create a sender with the given name.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            messages: Mutex::new(Vec::new()),
        }
    }

    /// Messages received so far.
    #[must_use]
    pub fn messages(&self) -> Vec<String> {
        lock(&self.messages).clone()
    }
}

impl CommandSender for MockSender {
    fn name(&self) -> &str {
        &self.name
    }

    fn send_message(&self, message: &str) {
        lock(&self.messages).push(message.to_owned());
    }
}
