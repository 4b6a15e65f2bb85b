//! Local sink backed by `tracing`.
//!
//! Records are re-emitted as events on the `logify.record` target at the
//! matching level. Formatting is left to whichever subscriber the binary
//! installs; with the JSON fmt layer each record becomes one console line.

use crate::errors::SinkError;
use crate::record::{Level, LogRecord};
use crate::sink::LogSink;

/// Target every forwarded record is emitted on.
pub const RECORD_TARGET: &str = "logify.record";

macro_rules! forward {
    ($event:ident, $record:expr, $request_id:expr, $fields:expr) => {
        tracing::$event!(
            target: RECORD_TARGET,
            service = $record.service(),
            request_id = $request_id,
            timestamp = %$record.timestamp_rfc3339(),
            fields = %$fields,
            "{}",
            $record.message()
        )
    };
}

/// Console-equivalent sink.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl TracingSink {
    pub fn new() -> Self {
        Self
    }
}

impl LogSink for TracingSink {
    fn name(&self) -> &str {
        "console"
    }

    fn deliver(&self, record: &LogRecord) -> Result<(), SinkError> {
        let fields = serde_json::to_string(record.fields())?;
        let request_id = record.request_id().map(|id| id.to_string());
        let request_id = request_id.as_deref();

        match record.level() {
            Level::Debug => forward!(debug, record, request_id, fields),
            Level::Info => forward!(info, record, request_id, fields),
            Level::Warn => forward!(warn, record, request_id, fields),
            Level::Error => forward!(error, record, request_id, fields),
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::{Arc, Mutex};
    use tracing::{Event, Subscriber};
    use tracing_subscriber::layer::{Context, Layer, SubscriberExt};
    use uuid::Uuid;

    #[derive(Clone, Default)]
    struct Captured(Arc<Mutex<Vec<(String, tracing::Level)>>>);

    impl<S: Subscriber> Layer<S> for Captured {
        fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
            let metadata = event.metadata();
            self.0
                .lock()
                .unwrap()
                .push((metadata.target().to_string(), *metadata.level()));
        }
    }

    #[test]
    fn test_name() {
        assert_eq!(TracingSink::new().name(), "console");
    }

    #[test]
    fn test_delivers_every_level() {
        let sink = TracingSink::new();
        for level in [Level::Debug, Level::Info, Level::Warn, Level::Error] {
            let record = LogRecord::new(level, "orders", "hello")
                .with_request_id(Uuid::new_v4())
                .with_field("orderId", json!({"id": 1, "items": [1, 2]}));
            assert!(sink.deliver(&record).is_ok());
        }
    }

    #[test]
    fn test_emits_each_record_at_its_own_level() {
        let captured = Captured::default();
        let subscriber = tracing_subscriber::registry().with(captured.clone());

        tracing::subscriber::with_default(subscriber, || {
            let sink = TracingSink::new();
            for level in [Level::Debug, Level::Info, Level::Warn, Level::Error] {
                sink.deliver(&LogRecord::new(level, "orders", "hello")).unwrap();
            }
        });

        let events = captured.0.lock().unwrap().clone();
        let expected: Vec<(String, tracing::Level)> = [
            tracing::Level::DEBUG,
            tracing::Level::INFO,
            tracing::Level::WARN,
            tracing::Level::ERROR,
        ]
        .into_iter()
        .map(|level| (RECORD_TARGET.to_string(), level))
        .collect();
        assert_eq!(events, expected);
    }

    #[test]
    fn test_delivers_without_request_id() {
        let record = LogRecord::new(Level::Info, "orders", "Service listening");
        assert!(TracingSink::new().deliver(&record).is_ok());
    }
}
