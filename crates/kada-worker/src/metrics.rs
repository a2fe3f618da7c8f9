//! Worker metrics.

use metrics::counter;

/// Metric name constants for consistency.
pub mod names {
    /// Segment query pages fetched.
    pub const SEGMENT_PAGES_TOTAL: &str = "kada_segment_pages_total";

    /// Publish attempts by outcome.
    pub const PUBLISH_ATTEMPTS_TOTAL: &str = "kada_publish_attempts_total";

    /// Rendered artifacts by kind and outcome.
    pub const ARTIFACTS_TOTAL: &str = "kada_artifacts_total";

    /// Inbound queue records by outcome.
    pub const QUEUE_RECORDS_TOTAL: &str = "kada_queue_records_total";
}

fn outcome(success: bool) -> &'static str {
    if success {
        "ok"
    } else {
        "error"
    }
}

/// Record one fetched segment page.
pub fn record_segment_page() {
    counter!(names::SEGMENT_PAGES_TOTAL).increment(1);
}

/// Record one publish attempt.
pub fn record_publish_attempt(delivered: bool) {
    counter!(names::PUBLISH_ATTEMPTS_TOTAL, "outcome" => outcome(delivered)).increment(1);
}

/// Record one rendered (or failed) artifact.
pub fn record_artifact(kind: &'static str, success: bool) {
    counter!(
        names::ARTIFACTS_TOTAL,
        "kind" => kind,
        "outcome" => outcome(success)
    )
    .increment(1);
}

/// Record the outcome of one inbound queue record.
pub fn record_queue_record(result: &'static str) {
    counter!(names::QUEUE_RECORDS_TOTAL, "result" => result).increment(1);
}
