//! Fan-out of log records to the configured sinks.

use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use tracing::debug;

use crate::observability::metrics::record_sink_error;
use crate::record::{Level, LogRecord};
use crate::sink::LogSink;

/// Delivers each accepted record to every sink, in order.
///
/// Severity is filtered once here, so a record below the minimum never
/// reaches any sink. Sink errors, and panics raised by a sink, are
/// self-logged at debug level and counted; `emit` itself never fails.
pub struct LogSinkDispatcher {
    minimum_severity: Level,
    sinks: Vec<Arc<dyn LogSink>>,
}

impl LogSinkDispatcher {
    pub fn new(minimum_severity: Level, sinks: Vec<Arc<dyn LogSink>>) -> Self {
        Self {
            minimum_severity,
            sinks,
        }
    }

    pub fn minimum_severity(&self) -> Level {
        self.minimum_severity
    }

    /// Whether a record at `level` would be delivered.
    pub fn accepts(&self, level: Level) -> bool {
        level >= self.minimum_severity
    }

    pub fn sink_names(&self) -> Vec<&str> {
        self.sinks.iter().map(|sink| sink.name()).collect()
    }

    pub fn emit(&self, record: &LogRecord) {
        if !self.accepts(record.level()) {
            return;
        }

        for sink in &self.sinks {
            match panic::catch_unwind(AssertUnwindSafe(|| sink.deliver(record))) {
                Ok(Ok(())) => {}
                Ok(Err(e)) => {
                    debug!(
                        target: "logify.dispatcher",
                        sink = sink.name(),
                        error = %e,
                        "Sink delivery failed"
                    );
                    record_sink_error(sink.name());
                }
                Err(_) => {
                    debug!(
                        target: "logify.dispatcher",
                        sink = sink.name(),
                        "Sink panicked during delivery"
                    );
                    record_sink_error(sink.name());
                }
            }
        }
    }
}

impl std::fmt::Debug for LogSinkDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LogSinkDispatcher")
            .field("minimum_severity", &self.minimum_severity)
            .field("sinks", &self.sink_names())
            .finish()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;
    use crate::errors::SinkError;
    use crate::testing::{FailingSink, MemorySink};

    struct PanickingSink;

    impl LogSink for PanickingSink {
        fn name(&self) -> &str {
            "panicking"
        }

        fn deliver(&self, _record: &LogRecord) -> Result<(), SinkError> {
            panic!("sink bug");
        }
    }

    fn record(level: Level) -> LogRecord {
        LogRecord::new(level, "orders", format!("{level} message"))
    }

    #[test]
    fn test_records_below_minimum_reach_no_sink() {
        let local = Arc::new(MemorySink::new());
        let remote = Arc::new(MemorySink::new());
        let dispatcher = LogSinkDispatcher::new(Level::Warn, vec![local.clone(), remote.clone()]);

        dispatcher.emit(&record(Level::Debug));
        dispatcher.emit(&record(Level::Info));
        dispatcher.emit(&record(Level::Warn));
        dispatcher.emit(&record(Level::Error));

        assert_eq!(local.messages(), vec!["warn message", "error message"]);
        assert_eq!(remote.messages(), vec!["warn message", "error message"]);
    }

    #[test]
    fn test_failing_sink_does_not_block_others() {
        let failing = Arc::new(FailingSink::new());
        let memory = Arc::new(MemorySink::new());
        let dispatcher = LogSinkDispatcher::new(Level::Info, vec![failing.clone(), memory.clone()]);

        dispatcher.emit(&record(Level::Info));
        dispatcher.emit(&record(Level::Error));

        assert_eq!(failing.attempts(), 2);
        assert_eq!(memory.records().len(), 2);
    }

    #[test]
    fn test_panicking_sink_is_contained() {
        let memory = Arc::new(MemorySink::new());
        let dispatcher =
            LogSinkDispatcher::new(Level::Info, vec![Arc::new(PanickingSink), memory.clone()]);

        dispatcher.emit(&record(Level::Info));

        assert_eq!(memory.records().len(), 1);
    }

    #[test]
    fn test_sinks_receive_in_order() {
        let memory = Arc::new(MemorySink::new());
        let dispatcher = LogSinkDispatcher::new(Level::Debug, vec![memory.clone()]);

        for i in 0..50 {
            dispatcher.emit(&LogRecord::new(Level::Info, "orders", format!("{i}")));
        }

        let expected: Vec<String> = (0..50).map(|i| i.to_string()).collect();
        assert_eq!(memory.messages(), expected);
    }

    #[test]
    fn test_debug_lists_sink_names() {
        let dispatcher = LogSinkDispatcher::new(
            Level::Info,
            vec![Arc::new(MemorySink::new()), Arc::new(FailingSink::new())],
        );
        assert_eq!(dispatcher.sink_names(), vec!["memory", "failing"]);
        assert!(format!("{dispatcher:?}").contains("memory"));
    }
}
