//! Test sinks.
//!
//! Enabled with the `test-utils` feature.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};

use crate::errors::SinkError;
use crate::record::LogRecord;
use crate::sink::LogSink;

/// Sink that keeps every record it receives.
#[derive(Debug, Default)]
pub struct MemorySink {
    records: Mutex<Vec<LogRecord>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of everything received so far, in delivery order.
    pub fn records(&self) -> Vec<LogRecord> {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn messages(&self) -> Vec<String> {
        self.records()
            .iter()
            .map(|record| record.message().to_string())
            .collect()
    }

    /// First record with the given message.
    pub fn find(&self, message: &str) -> Option<LogRecord> {
        self.records()
            .into_iter()
            .find(|record| record.message() == message)
    }

    /// All records with the given message.
    pub fn find_all(&self, message: &str) -> Vec<LogRecord> {
        self.records()
            .into_iter()
            .filter(|record| record.message() == message)
            .collect()
    }

    pub fn clear(&self) {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}

impl LogSink for MemorySink {
    fn name(&self) -> &str {
        "memory"
    }

    fn deliver(&self, record: &LogRecord) -> Result<(), SinkError> {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(record.clone());
        Ok(())
    }
}

/// Sink that rejects everything, standing in for an unreachable backend.
#[derive(Debug, Default)]
pub struct FailingSink {
    attempts: AtomicUsize,
}

impl FailingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }
}

impl LogSink for FailingSink {
    fn name(&self) -> &str {
        "failing"
    }

    fn deliver(&self, _record: &LogRecord) -> Result<(), SinkError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        Err(SinkError::Unavailable("connection refused".to_string()))
    }
}
