//! Log records as delivered to sinks.

use crate::severity::Severity;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;

/// One rendered log event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LogRecord {
    pub timestamp: DateTime<Utc>,
    pub severity: Severity,
    pub logger: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thread: Option<String>,
    pub process_id: u32,
}

impl LogRecord {
    /// Stamp a record with the current time, thread and process.
    pub fn new(severity: Severity, logger: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            timestamp: Utc::now(),
            severity,
            logger: logger.into(),
            message: message.into(),
            thread: std::thread::current().name().map(str::to_string),
            process_id: std::process::id(),
        }
    }

    /// `2024-05-01T10:00:00.123Z [INFO] orders: message`
    pub fn render_line(&self) -> String {
        format!(
            "{} [{}] {}: {}",
            self.timestamp.to_rfc3339_opts(SecondsFormat::Millis, true),
            self.severity,
            self.logger,
            self.message
        )
    }

    /// Single-line JSON encoding used on the wire by the viewer sink.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}
