//! Formatting of upstream log streams into plain text
//!
//! Build logs arrive as a JSON array of heterogeneous event objects;
//! runtime logs arrive as newline-delimited JSON. Both are rendered to
//! one timestamped text line per record. Formatting is total: malformed
//! input is carried through verbatim, never dropped.

use chrono::{SecondsFormat, TimeZone, Utc};
use serde_json::Value;

/// Render an epoch-milliseconds timestamp as ISO-8601 with millisecond
/// precision and a `Z` suffix
pub fn iso_timestamp(epoch_ms: i64) -> String {
    Utc.timestamp_millis_opt(epoch_ms)
        .single()
        .unwrap_or_else(Utc::now)
        .to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Format a build event stream, one line per event, upstream order preserved
pub fn format_build_events(events: &[Value]) -> String {
    events
        .iter()
        .map(build_event_line)
        .collect::<Vec<_>>()
        .join("\n")
}

/// Render one build event as `[timestamp] text`
///
/// The event's `text` field is preferred, then `payload.text`, and as a
/// last resort the whole event is serialized.
fn build_event_line(event: &Value) -> String {
    let created = event
        .get("created")
        .and_then(Value::as_i64)
        .unwrap_or_else(|| Utc::now().timestamp_millis());

    let text = event
        .get("text")
        .and_then(Value::as_str)
        .map(str::to_string)
        .or_else(|| {
            event
                .get("payload")
                .and_then(|payload| payload.get("text"))
                .and_then(Value::as_str)
                .map(str::to_string)
        })
        .unwrap_or_else(|| event.to_string());

    format!("[{}] {}", iso_timestamp(created), text)
}

/// One runtime log line, either parsed NDJSON or carried through raw
#[derive(Debug, Clone, PartialEq)]
pub enum RuntimeRecord {
    Parsed {
        timestamp_ms: i64,
        level: String,
        message: String,
    },
    Raw(String),
}

/// Parse a single runtime log line
///
/// Missing fields fall back: timestamp to now, level to `info`, message to
/// the full serialized record. A line that is not valid JSON is preserved
/// as `Raw`.
pub fn parse_runtime_line(line: &str) -> RuntimeRecord {
    match serde_json::from_str::<Value>(line) {
        Ok(record) => {
            let timestamp_ms = record
                .get("timestampInMs")
                .and_then(Value::as_i64)
                .unwrap_or_else(|| Utc::now().timestamp_millis());
            let level = record
                .get("level")
                .and_then(Value::as_str)
                .unwrap_or("info")
                .to_string();
            let message = record
                .get("message")
                .and_then(Value::as_str)
                .map(str::to_string)
                .unwrap_or_else(|| record.to_string());

            RuntimeRecord::Parsed {
                timestamp_ms,
                level,
                message,
            }
        }
        Err(_) => RuntimeRecord::Raw(line.to_string()),
    }
}

impl RuntimeRecord {
    /// Render as a display line
    pub fn to_line(&self) -> String {
        match self {
            RuntimeRecord::Parsed {
                timestamp_ms,
                level,
                message,
            } => format!(
                "[{}] [{}] {}",
                iso_timestamp(*timestamp_ms),
                level.to_uppercase(),
                message
            ),
            RuntimeRecord::Raw(line) => line.clone(),
        }
    }
}

/// Format a newline-delimited JSON runtime log stream
///
/// Total over arbitrary input: one output line per non-empty input line,
/// order preserved.
pub fn format_runtime_logs(body: &str) -> String {
    body.trim()
        .split('\n')
        .filter(|line| !line.is_empty())
        .map(|line| parse_runtime_line(line).to_line())
        .collect::<Vec<_>>()
        .join("\n")
}
