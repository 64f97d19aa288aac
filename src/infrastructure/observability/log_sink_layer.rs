use std::fmt::{self, Write as _};

use tracing::field::{Field, Visit};
use tracing::level_filters::LevelFilter;
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::Layer;
use tracing_subscriber::layer::Context;

use crate::domain::{LogEntry, LogLevel};

use super::LogSink;

/// Targets whose events stay out of the sink. HTTP access events would
/// otherwise be appended by every request to the logs endpoint itself.
const EXCLUDED_TARGET_PREFIXES: &[&str] = &["tower_http"];

/// Forwards every `tracing` event at or above `max_level` into a [`LogSink`],
/// except HTTP access events.
pub struct LogSinkLayer {
    sink: LogSink,
    max_level: LevelFilter,
}

impl LogSinkLayer {
    pub fn new(sink: LogSink, max_level: LevelFilter) -> Self {
        Self { sink, max_level }
    }
}

impl<S: Subscriber> Layer<S> for LogSinkLayer {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let metadata = event.metadata();
        if self.max_level < *metadata.level() || is_excluded(metadata.target()) {
            return;
        }

        let mut visitor = MessageVisitor::default();
        event.record(&mut visitor);

        self.sink.push(LogEntry::new(
            map_level(metadata.level()),
            visitor.finish(),
            metadata.target().to_string(),
        ));
    }
}

fn is_excluded(target: &str) -> bool {
    EXCLUDED_TARGET_PREFIXES
        .iter()
        .filter_map(|prefix| target.strip_prefix(prefix))
        .any(|rest| rest.is_empty() || rest.starts_with("::"))
}

fn map_level(level: &Level) -> LogLevel {
    match *level {
        Level::ERROR => LogLevel::Error,
        Level::WARN => LogLevel::Warn,
        Level::INFO => LogLevel::Info,
        _ => LogLevel::Log,
    }
}

/// Renders `message` first, then the remaining fields as `key=value`.
#[derive(Default)]
struct MessageVisitor {
    message: String,
    fields: String,
}

impl MessageVisitor {
    fn finish(self) -> String {
        match (self.message.is_empty(), self.fields.is_empty()) {
            (_, true) => self.message,
            (true, false) => self.fields,
            (false, false) => format!("{} {}", self.message, self.fields),
        }
    }

    fn push_field(&mut self, name: &str, value: fmt::Arguments<'_>) {
        if !self.fields.is_empty() {
            self.fields.push(' ');
        }
        let _ = write!(self.fields, "{}={}", name, value);
    }
}

impl Visit for MessageVisitor {
    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            self.message = value.to_string();
        } else {
            self.push_field(field.name(), format_args!("{}", value));
        }
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        if field.name() == "message" {
            self.message = format!("{:?}", value);
        } else {
            self.push_field(field.name(), format_args!("{:?}", value));
        }
    }
}
