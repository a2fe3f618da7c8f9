//! Record store metrics.

use metrics::{counter, histogram};

/// Metric name constants for consistency.
pub mod names {
    /// Total record store requests by operation and outcome.
    pub const REQUESTS_TOTAL: &str = "records_requests_total";

    /// Request latency in seconds by operation.
    pub const LATENCY_SECONDS: &str = "records_latency_seconds";
}

/// Record metrics for a completed record store request.
pub fn record_request(operation: &str, success: bool, latency_ms: f64) {
    let outcome = if success { "ok" } else { "error" };

    counter!(
        names::REQUESTS_TOTAL,
        "operation" => operation.to_string(),
        "outcome" => outcome
    )
    .increment(1);

    histogram!(
        names::LATENCY_SECONDS,
        "operation" => operation.to_string()
    )
    .record(latency_ms / 1000.0);
}
