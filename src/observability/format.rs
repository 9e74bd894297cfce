//! Lograge-style JSON line formatting.
//!
//! # Responsibilities
//! - Render a log event as a single JSON object on one line
//! - Keep only the recognized access-log keys from the event fields
//! - Add `@timestamp`, `severity` and `message`
//!
//! # Design Decisions
//! - `LogrageFormatter` is a pure function over `LogEvent`; the tracing
//!   integration (`LogrageFormat`) only collects fields and delegates
//! - No coercion: values are written exactly as they arrive

use std::fmt::{self, Write as _};

use chrono::{DateTime, Local, SecondsFormat};
use serde_json::{Map, Value};
use tracing::field::{Field, Visit};
use tracing::{Event, Subscriber};
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::{FmtContext, FormatEvent, FormatFields};
use tracing_subscriber::registry::LookupSpan;

use crate::observability::sink::RECORD_FIELD;

/// Field names copied from the event into the output line.
pub const RECOGNIZED_KEYS: [&str; 13] = [
    "method",
    "path",
    "format",
    "duration",
    "controller",
    "action",
    "status",
    "view",
    "db",
    "params",
    "exception",
    "exception_object",
    "host",
];

/// A logging event as seen by the formatter.
#[derive(Debug, Clone)]
pub struct LogEvent {
    pub message: String,
    pub severity: String,
    pub created: DateTime<Local>,
    pub fields: Map<String, Value>,
}

impl LogEvent {
    pub fn new(severity: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            severity: severity.into(),
            created: Local::now(),
            fields: Map::new(),
        }
    }

    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(key.into(), value.into());
        self
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct LogrageFormatter;

impl LogrageFormatter {
    pub fn new() -> Self {
        Self
    }

    pub fn format(&self, event: &LogEvent) -> String {
        let mut output = Map::new();

        for key in RECOGNIZED_KEYS {
            if let Some(value) = event.fields.get(key) {
                output.insert(key.to_string(), value.clone());
            }
        }

        output.insert(
            "@timestamp".to_string(),
            Value::String(event.created.to_rfc3339_opts(SecondsFormat::Micros, false)),
        );
        output.insert("severity".to_string(), Value::String(event.severity.clone()));
        output.insert("message".to_string(), Value::String(event.message.clone()));

        Value::Object(output).to_string()
    }
}

/// `tracing_subscriber` event format producing lograge JSON lines.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogrageFormat {
    formatter: LogrageFormatter,
}

impl LogrageFormat {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<S, N> FormatEvent<S, N> for LogrageFormat
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        _ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> fmt::Result {
        let mut visitor = FieldVisitor::default();
        event.record(&mut visitor);

        let log_event = LogEvent {
            message: visitor.message.unwrap_or_default(),
            severity: event.metadata().level().to_string(),
            created: Local::now(),
            fields: visitor.fields,
        };

        writeln!(writer, "{}", self.formatter.format(&log_event))
    }
}

#[derive(Default)]
struct FieldVisitor {
    message: Option<String>,
    fields: Map<String, Value>,
}

impl FieldVisitor {
    fn insert(&mut self, field: &Field, value: Value) {
        self.fields.insert(field.name().to_string(), value);
    }
}

impl Visit for FieldVisitor {
    fn record_str(&mut self, field: &Field, value: &str) {
        match field.name() {
            "message" => self.message = Some(value.to_string()),
            RECORD_FIELD => match serde_json::from_str::<Map<String, Value>>(value) {
                Ok(record) => self.fields.extend(record),
                Err(_) => self.insert(field, Value::String(value.to_string())),
            },
            _ => self.insert(field, Value::String(value.to_string())),
        }
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        let rendered = format!("{:?}", value);
        if field.name() == "message" {
            self.message = Some(rendered);
        } else {
            self.insert(field, Value::String(rendered));
        }
    }

    fn record_f64(&mut self, field: &Field, value: f64) {
        let value = serde_json::Number::from_f64(value)
            .map(Value::Number)
            .unwrap_or(Value::Null);
        self.insert(field, value);
    }

    fn record_i64(&mut self, field: &Field, value: i64) {
        self.insert(field, Value::from(value));
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        self.insert(field, Value::from(value));
    }

    fn record_bool(&mut self, field: &Field, value: bool) {
        self.insert(field, Value::Bool(value));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn format(event: &LogEvent) -> Value {
        serde_json::from_str(&LogrageFormatter::new().format(event)).unwrap()
    }

    #[test]
    fn adds_basic_info() {
        let formatted = format(&LogEvent::new("NOTSET", "message"));
        assert!(formatted.get("@timestamp").is_some());
        assert_eq!(formatted["severity"], "NOTSET");
        assert_eq!(formatted["message"], "message");
    }

    #[test]
    fn copies_recognized_fields_verbatim() {
        let extra = json!({
            "method": "POST",
            "path": "/url/path",
            "format": "application/json",
            "duration": 0.1,
            "controller": "controller",
            "action": "action",
            "status": 200,
            "view": "view",
            "db": 0.1,
            "params": "?some=parameters",
            "exception": null,
            "exception_object": null,
            "host": "localhost"
        });
        let mut event = LogEvent::new("INFO", "message");
        event.fields = extra.as_object().unwrap().clone();

        let formatted = format(&event);
        for (key, value) in extra.as_object().unwrap() {
            assert_eq!(&formatted[key], value, "{key}");
        }
    }

    #[test]
    fn drops_unrecognized_fields() {
        let event = LogEvent::new("INFO", "message")
            .with_field("status", 200)
            .with_field("request_id", "abc")
            .with_field("user", "alice");
        let formatted = format(&event);
        let object = formatted.as_object().unwrap();
        assert_eq!(object.len(), 4);
        assert_eq!(formatted["status"], 200);
        assert!(object.get("request_id").is_none());
    }

    #[test]
    fn timestamp_has_offset() {
        let created = DateTime::parse_from_rfc3339("2018-07-09T12:35:00.5+02:00")
            .unwrap()
            .with_timezone(&Local);
        let mut event = LogEvent::new("INFO", "message");
        event.created = created;

        let formatted = format(&event);
        let stamp = formatted["@timestamp"].as_str().unwrap();
        let parsed = DateTime::parse_from_rfc3339(stamp).unwrap();
        assert_eq!(parsed, created);
        let offset = &stamp[stamp.len() - 6..];
        assert!(offset.starts_with('+') || offset.starts_with('-'), "{stamp}");
    }

    #[test]
    fn output_is_single_line() {
        let event = LogEvent::new("INFO", "line one\nline two").with_field("path", "/a\nb");
        let line = LogrageFormatter::new().format(&event);
        assert!(!line.contains('\n'));
    }
}
