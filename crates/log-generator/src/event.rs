//! The document shipped to Logstash.

use chrono::{SecondsFormat, Utc};
use serde::Serialize;
use std::collections::BTreeMap;

pub type Labels = BTreeMap<String, String>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum EventLevel {
    Info,
    Error,
}

impl EventLevel {
    /// Status codes of 400 and above are errors; zero means "no status".
    pub fn for_status(status_code: u16) -> Self {
        if status_code >= 400 {
            EventLevel::Error
        } else {
            EventLevel::Info
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LogEvent {
    #[serde(rename = "@timestamp")]
    pub timestamp: String,
    pub level: EventLevel,
    pub message: String,
    pub service: String,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub labels: Labels,
    #[serde(skip_serializing_if = "is_zero_ms")]
    pub duration_ms: u64,
    #[serde(skip_serializing_if = "is_zero_status")]
    pub status_code: u16,
}

fn is_zero_ms(value: &u64) -> bool {
    *value == 0
}

fn is_zero_status(value: &u16) -> bool {
    *value == 0
}

impl LogEvent {
    /// A simulated request outcome. The level follows the status code.
    pub fn new(
        service: &str,
        message: impl Into<String>,
        labels: Labels,
        duration_ms: u64,
        status_code: u16,
    ) -> Self {
        Self {
            timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Nanos, true),
            level: EventLevel::for_status(status_code),
            message: message.into(),
            service: service.to_string(),
            labels,
            duration_ms,
            status_code,
        }
    }

    /// A bare message with no labels, duration or status.
    pub fn notice(service: &str, level: EventLevel, message: impl Into<String>) -> Self {
        Self {
            level,
            ..Self::new(service, message, Labels::new(), 0, 0)
        }
    }

    pub fn is_error(&self) -> bool {
        self.level == EventLevel::Error
    }

    pub fn label(&self, key: &str) -> Option<&str> {
        self.labels.get(key).map(String::as_str)
    }

    /// One newline-terminated JSON document, as the Logstash `json_lines`
    /// codec expects.
    pub fn to_line(&self) -> Result<Vec<u8>, serde_json::Error> {
        let mut line = serde_json::to_vec(self)?;
        line.push(b'\n');
        Ok(line)
    }
}
