//! Metrics recorded through the `metrics` facade.
//!
//! Logify never installs a recorder; the service binary decides where the
//! numbers go (Prometheus in this workspace).
//!
//! # Cardinality
//!
//! - `method`: standard HTTP methods
//! - `endpoint`: the matched route template, or `unmatched`
//! - `status`: 4 values (success, client_error, server_error, aborted)
//! - `sink`: one per configured sink
//! - `outcome`: 3 values (delivered, failed, dropped)

use metrics::{counter, histogram};
use std::time::Duration;

/// Endpoint label for requests that did not match a route.
pub const UNMATCHED_ENDPOINT: &str = "unmatched";

/// Pseudo status code used when the client went away before a response.
pub const ABORTED_STATUS: u16 = 499;

// ============================================================================
// HTTP Request Metrics
// ============================================================================

/// Record one finalized request.
///
/// Metric: `logify_http_requests_total`, `logify_http_request_duration_seconds`
/// Labels: `method`, `endpoint`, `status` (histogram) / `status_code` (counter)
pub fn record_http_request(method: &str, endpoint: &str, status_code: u16, duration: Duration) {
    let status = categorize_status_code(status_code);

    histogram!("logify_http_request_duration_seconds",
        "method" => method.to_string(),
        "endpoint" => endpoint.to_string(),
        "status" => status
    )
    .record(duration.as_secs_f64());

    counter!("logify_http_requests_total",
        "method" => method.to_string(),
        "endpoint" => endpoint.to_string(),
        "status_code" => status_code.to_string()
    )
    .increment(1);
}

fn categorize_status_code(status_code: u16) -> &'static str {
    match status_code {
        ABORTED_STATUS => "aborted",
        0..=399 => "success",
        400..=499 => "client_error",
        _ => "server_error",
    }
}

// ============================================================================
// Sink Metrics
// ============================================================================

/// Record a delivery error reported by a sink.
///
/// Metric: `logify_sink_errors_total`
/// Labels: `sink`
pub fn record_sink_error(sink: &str) {
    counter!("logify_sink_errors_total", "sink" => sink.to_string()).increment(1);
}

/// Record the fate of a record handed to the remote sink.
///
/// Metric: `logify_remote_sink_records_total`
/// Labels: `outcome` (delivered, failed, dropped)
pub fn record_remote_delivery(outcome: &'static str) {
    counter!("logify_remote_sink_records_total", "outcome" => outcome).increment(1);
}
