//! Structured log records and severity levels.
//!
//! A [`LogRecord`] is the unit every sink receives. Its wire form is a flat
//! JSON document:
//!
//! ```text
//! { "level", "message", "timestamp", "service", "requestId"?, ...fields }
//! ```
//!
//! Downstream log consumers query by these names, so they are part of the
//! external contract. Caller-supplied fields can never shadow them: reserved
//! keys are dropped when the record is built.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use uuid::Uuid;

/// Top-level keys of the wire document that fields may not override.
pub const RESERVED_KEYS: &[&str] = &["level", "message", "timestamp", "service", "requestId"];

/// Key under which a correlation id travels in caller-supplied fields.
pub const REQUEST_ID_KEY: &str = "requestId";

/// Arbitrary structured fields attached to a record.
pub type Fields = Map<String, Value>;

/// Record severity, ordered from least to most severe.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl Level {
    /// Returns the wire name of the level.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Level::Debug => "debug",
            Level::Info => "info",
            Level::Warn => "warn",
            Level::Error => "error",
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a string does not name a [`Level`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown log level: {0}")]
pub struct ParseLevelError(pub String);

impl FromStr for Level {
    type Err = ParseLevelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "debug" => Ok(Level::Debug),
            "info" => Ok(Level::Info),
            "warn" | "warning" => Ok(Level::Warn),
            "error" => Ok(Level::Error),
            _ => Err(ParseLevelError(s.to_string())),
        }
    }
}

/// An immutable structured log record.
///
/// Built once at the call site with the `with_*` methods and then only
/// borrowed by sinks.
#[derive(Debug, Clone, PartialEq)]
pub struct LogRecord {
    level: Level,
    message: String,
    timestamp: DateTime<Utc>,
    service: String,
    request_id: Option<Uuid>,
    fields: Fields,
}

impl LogRecord {
    /// Create a record stamped with the current time.
    pub fn new(level: Level, service: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
            timestamp: Utc::now(),
            service: service.into(),
            request_id: None,
            fields: Fields::new(),
        }
    }

    /// Tag the record with a correlation id.
    #[must_use]
    pub fn with_request_id(mut self, request_id: Uuid) -> Self {
        self.request_id = Some(request_id);
        self
    }

    /// Override the timestamp.
    #[must_use]
    pub fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = timestamp;
        self
    }

    /// Add a single field. Reserved keys are ignored.
    #[must_use]
    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert_field(key.into(), value.into());
        self
    }

    /// Merge a set of fields.
    ///
    /// Reserved keys are dropped. A `requestId` entry that parses as a UUID
    /// tags the record when no id has been set yet, so call sites can pass
    /// the correlation id the same way as any other field.
    #[must_use]
    pub fn with_fields(mut self, fields: Fields) -> Self {
        for (key, value) in fields {
            self.insert_field(key, value);
        }
        self
    }

    fn insert_field(&mut self, key: String, value: Value) {
        if key == REQUEST_ID_KEY {
            if self.request_id.is_none() {
                self.request_id = value.as_str().and_then(|s| Uuid::parse_str(s).ok());
            }
            return;
        }
        if RESERVED_KEYS.contains(&key.as_str()) {
            return;
        }
        self.fields.insert(key, value);
    }

    pub fn level(&self) -> Level {
        self.level
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    pub fn service(&self) -> &str {
        &self.service
    }

    pub fn request_id(&self) -> Option<Uuid> {
        self.request_id
    }

    pub fn fields(&self) -> &Fields {
        &self.fields
    }

    /// Look up a field by name.
    pub fn field(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    /// RFC 3339 UTC timestamp with millisecond precision.
    pub fn timestamp_rfc3339(&self) -> String {
        self.timestamp.to_rfc3339_opts(SecondsFormat::Millis, true)
    }

    /// Render the flat wire document.
    ///
    /// # Errors
    ///
    /// Returns an error if a field value cannot be represented as JSON.
    pub fn to_document(&self) -> Result<Value, serde_json::Error> {
        serde_json::to_value(self)
    }
}

impl Serialize for LogRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let len = 4 + usize::from(self.request_id.is_some()) + self.fields.len();
        let mut map = serializer.serialize_map(Some(len))?;
        map.serialize_entry("level", &self.level)?;
        map.serialize_entry("message", &self.message)?;
        map.serialize_entry("timestamp", &self.timestamp_rfc3339())?;
        map.serialize_entry("service", &self.service)?;
        if let Some(request_id) = &self.request_id {
            map.serialize_entry(REQUEST_ID_KEY, request_id)?;
        }
        for (key, value) in &self.fields {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

/// Convert an arbitrary JSON value into record fields.
///
/// Objects are used as-is, `null` means no fields, and any other value is
/// kept under a single `value` key.
pub fn fields_from(value: Value) -> Fields {
    match value {
        Value::Object(map) => map,
        Value::Null => Fields::new(),
        other => {
            let mut fields = Fields::new();
            fields.insert("value".to_string(), other);
            fields
        }
    }
}
