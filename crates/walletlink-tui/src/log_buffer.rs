//! In-memory log capture for the log pane.
//!
//! [`LogBufferLayer`] is a `tracing_subscriber` layer that records events into
//! a bounded [`LogBuffer`] shared with the renderer.

use std::collections::VecDeque;
use std::fmt::Write as _;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing_subscriber::Layer;

/// Maximum number of log lines to keep.
const MAX_LOG_LINES: usize = 1000;

/// A captured log event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogLine {
    pub level: LogLevel,
    pub target: String,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "TRACE",
            LogLevel::Debug => "DEBUG",
            LogLevel::Info => "INFO",
            LogLevel::Warn => "WARN",
            LogLevel::Error => "ERROR",
        }
    }
}

impl From<&tracing::Level> for LogLevel {
    fn from(level: &tracing::Level) -> Self {
        match *level {
            tracing::Level::TRACE => LogLevel::Trace,
            tracing::Level::DEBUG => LogLevel::Debug,
            tracing::Level::INFO => LogLevel::Info,
            tracing::Level::WARN => LogLevel::Warn,
            tracing::Level::ERROR => LogLevel::Error,
        }
    }
}

/// Bounded ring of log lines. Clones share the same buffer.
#[derive(Debug, Clone, Default)]
pub struct LogBuffer {
    inner: Arc<Mutex<VecDeque<LogLine>>>,
}

impl LogBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, VecDeque<LogLine>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Push a new log line, dropping the oldest at capacity.
    pub fn push(&self, line: LogLine) {
        let mut buffer = self.lock();
        if buffer.len() >= MAX_LOG_LINES {
            buffer.pop_front();
        }
        buffer.push_back(line);
    }

    #[cfg(test)]
    pub fn get_lines(&self) -> Vec<LogLine> {
        self.lock().iter().cloned().collect()
    }

    /// The last `count` lines, skipping the newest `skip`.
    pub fn tail(&self, count: usize, skip: usize) -> Vec<LogLine> {
        let buffer = self.lock();
        let end = buffer.len().saturating_sub(skip);
        let start = end.saturating_sub(count);
        buffer.range(start..end).cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of lines at `level` or above.
    pub fn count_at_least(&self, level: LogLevel) -> usize {
        self.lock().iter().filter(|l| l.level >= level).count()
    }
}

/// A tracing layer that writes into a [`LogBuffer`].
pub struct LogBufferLayer {
    buffer: LogBuffer,
}

impl LogBufferLayer {
    pub fn new(buffer: LogBuffer) -> Self {
        Self { buffer }
    }
}

impl<S> Layer<S> for LogBufferLayer
where
    S: tracing::Subscriber,
{
    fn on_event(
        &self,
        event: &tracing::Event<'_>,
        _ctx: tracing_subscriber::layer::Context<'_, S>,
    ) {
        let metadata = event.metadata();
        let mut visitor = MessageVisitor::default();
        event.record(&mut visitor);

        self.buffer.push(LogLine {
            level: LogLevel::from(metadata.level()),
            target: metadata.target().to_string(),
            message: visitor.finish(),
        });
    }
}

/// Collects the `message` field plus any structured fields as `key=value`.
#[derive(Default)]
struct MessageVisitor {
    message: Option<String>,
    fields: String,
}

impl MessageVisitor {
    fn push_field(&mut self, name: &str, value: std::fmt::Arguments<'_>) {
        if !self.fields.is_empty() {
            self.fields.push(' ');
        }
        let _ = write!(self.fields, "{}={}", name, value);
    }

    fn finish(self) -> String {
        match (self.message, self.fields.is_empty()) {
            (Some(message), true) => message,
            (Some(message), false) => format!("{} {}", message, self.fields),
            (None, _) => self.fields,
        }
    }
}

impl tracing::field::Visit for MessageVisitor {
    fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
        if field.name() == "message" {
            self.message = Some(format!("{:?}", value));
        } else {
            self.push_field(field.name(), format_args!("{:?}", value));
        }
    }

    fn record_str(&mut self, field: &tracing::field::Field, value: &str) {
        if field.name() == "message" {
            self.message = Some(value.to_string());
        } else {
            self.push_field(field.name(), format_args!("{}", value));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing_subscriber::layer::SubscriberExt;

    fn line(level: LogLevel, message: &str) -> LogLine {
        LogLine {
            level,
            target: "test".to_string(),
            message: message.to_string(),
        }
    }

    #[test]
    fn test_log_level_order() {
        assert!(LogLevel::Error > LogLevel::Warn);
        assert!(LogLevel::Debug < LogLevel::Info);
        assert_eq!(LogLevel::from(&tracing::Level::WARN), LogLevel::Warn);
        assert_eq!(LogLevel::Warn.as_str(), "WARN");
    }

    #[test]
    fn test_log_buffer_push_and_get() {
        let buffer = LogBuffer::new();
        assert!(buffer.is_empty());

        buffer.push(line(LogLevel::Info, "Hello"));
        assert_eq!(buffer.len(), 1);
        assert_eq!(buffer.get_lines()[0].message, "Hello");
    }

    #[test]
    fn test_log_buffer_capacity_limit() {
        let buffer = LogBuffer::new();
        for i in 0..MAX_LOG_LINES + 100 {
            buffer.push(line(LogLevel::Info, &format!("Message {}", i)));
        }
        assert_eq!(buffer.len(), MAX_LOG_LINES);
        assert_eq!(buffer.get_lines()[0].message, "Message 100");
    }

    #[test]
    fn test_tail_with_scroll() {
        let buffer = LogBuffer::new();
        for i in 0..20 {
            buffer.push(line(LogLevel::Info, &format!("{}", i)));
        }

        let newest: Vec<_> = buffer.tail(3, 0).into_iter().map(|l| l.message).collect();
        assert_eq!(newest, vec!["17", "18", "19"]);

        let scrolled: Vec<_> = buffer.tail(3, 5).into_iter().map(|l| l.message).collect();
        assert_eq!(scrolled, vec!["12", "13", "14"]);

        assert_eq!(buffer.tail(50, 0).len(), 20);
        assert!(buffer.tail(3, 100).is_empty());
    }

    #[test]
    fn test_count_at_least() {
        let buffer = LogBuffer::new();
        buffer.push(line(LogLevel::Debug, "a"));
        buffer.push(line(LogLevel::Warn, "b"));
        buffer.push(line(LogLevel::Error, "c"));
        assert_eq!(buffer.count_at_least(LogLevel::Warn), 2);
        assert_eq!(buffer.count_at_least(LogLevel::Trace), 3);
    }

    #[test]
    fn test_clones_share_buffer() {
        let buffer = LogBuffer::new();
        let other = buffer.clone();
        buffer.push(line(LogLevel::Info, "shared"));
        assert_eq!(other.len(), 1);
    }

    #[test]
    fn test_layer_captures_message_and_fields() {
        let buffer = LogBuffer::new();
        let subscriber =
            tracing_subscriber::registry().with(LogBufferLayer::new(buffer.clone()));

        tracing::subscriber::with_default(subscriber, || {
            tracing::info!("Connected");
            tracing::warn!(code = 4001, "Rejected");
            tracing::debug!(account = "0xabc");
        });

        let lines = buffer.get_lines();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0].message, "Connected");
        assert_eq!(lines[0].level, LogLevel::Info);
        assert_eq!(lines[1].message, "Rejected code=4001");
        assert_eq!(lines[2].message, "account=0xabc");
    }

    #[test]
    fn test_log_buffer_thread_safety() {
        use std::thread;

        let buffer = LogBuffer::new();
        let buffer_clone = buffer.clone();

        let handle = thread::spawn(move || {
            for i in 0..100 {
                buffer_clone.push(line(LogLevel::Debug, &format!("Thread message {}", i)));
            }
        });
        for i in 0..100 {
            buffer.push(line(LogLevel::Info, &format!("Main message {}", i)));
        }
        handle.join().unwrap();

        assert_eq!(buffer.len(), 200);
    }
}
