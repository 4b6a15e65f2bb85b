//! Running API statistics.
//!
//! [`StatsAggregator::update`] is the only writer of [`ApiStats`]. The
//! update is one synchronous critical section (no `.await` inside), so
//! concurrent requests on a multi-threaded runtime can never interleave
//! halfway through the running-mean computation.

use axum::http::StatusCode;
use serde::{Deserialize, Serialize};
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

/// Fractional milliseconds, exact for whole-millisecond durations.
#[allow(clippy::cast_precision_loss)]
pub fn duration_ms(duration: Duration) -> f64 {
    duration.as_nanos() as f64 / 1_000_000.0
}

/// How a request ended, for accounting purposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Success,
    Failure,
}

impl Outcome {
    /// Status codes below 400 are successes.
    #[must_use]
    pub fn from_status(status: StatusCode) -> Self {
        if status.as_u16() < 400 {
            Outcome::Success
        } else {
            Outcome::Failure
        }
    }

    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Outcome::Success => "success",
            Outcome::Failure => "failure",
        }
    }
}

/// Snapshot of a service's aggregate request statistics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiStats {
    pub total_requests: u64,
    pub successful_requests: u64,
    pub failed_requests: u64,
    pub average_response_time_ms: f64,
}

/// Owner of the per-service [`ApiStats`].
#[derive(Debug, Default)]
pub struct StatsAggregator {
    stats: Mutex<ApiStats>,
}

impl StatsAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one finished request and return the updated snapshot.
    ///
    /// Negative or NaN latencies are clamped to zero.
    pub fn update(&self, elapsed_ms: f64, outcome: Outcome) -> ApiStats {
        let elapsed_ms = elapsed_ms.max(0.0);
        // Counters stay consistent even if a holder panicked: every write
        // below completes before the guard is released.
        let mut stats = self.stats.lock().unwrap_or_else(PoisonError::into_inner);

        stats.total_requests += 1;
        match outcome {
            Outcome::Success => stats.successful_requests += 1,
            Outcome::Failure => stats.failed_requests += 1,
        }

        let total = stats.total_requests as f64;
        stats.average_response_time_ms =
            (stats.average_response_time_ms * (total - 1.0) + elapsed_ms) / total;

        *stats
    }

    /// Read-only copy of the current statistics.
    pub fn get_stats(&self) -> ApiStats {
        *self.stats.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
