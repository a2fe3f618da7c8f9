//! Per-job log lines.
//!
//! Every line of a resolve or render run carries the same `job_id` and
//! `operation` fields, and the completion line reports the elapsed time.

use std::time::Instant;

use tracing::{error, info, warn, Span};

/// Logger bound to one job and one operation.
#[derive(Debug, Clone)]
pub struct JobLogger {
    /// Segmentation job id, or the source object for renders
    job_id: String,
    operation: &'static str,
    started: Instant,
}

impl JobLogger {
    pub fn new(job_id: &str, operation: &'static str) -> Self {
        Self {
            job_id: job_id.to_string(),
            operation,
            started: Instant::now(),
        }
    }

    pub fn log_start(&self, message: &str) {
        info!(job_id = %self.job_id, operation = self.operation, "Job started: {}", message);
    }

    /// Non-fatal problem; the operation carries on.
    pub fn log_warning(&self, message: &str) {
        warn!(job_id = %self.job_id, operation = self.operation, "Job warning: {}", message);
    }

    pub fn log_error(&self, message: &str) {
        error!(job_id = %self.job_id, operation = self.operation, "Job error: {}", message);
    }

    pub fn log_completion(&self, message: &str) {
        info!(
            job_id = %self.job_id,
            operation = self.operation,
            elapsed_ms = self.elapsed_ms(),
            "Job completed: {}", message
        );
    }

    pub fn job_id(&self) -> &str {
        &self.job_id
    }

    pub fn operation(&self) -> &'static str {
        self.operation
    }

    /// Milliseconds since the logger was created.
    pub fn elapsed_ms(&self) -> u64 {
        self.started.elapsed().as_millis() as u64
    }

    /// Span grouping everything logged below one job.
    pub fn create_span(&self) -> Span {
        tracing::info_span!("job", job_id = %self.job_id, operation = self.operation)
    }
}
