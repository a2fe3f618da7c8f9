//! Worker error types.

use thiserror::Error;

pub type WorkerResult<T> = Result<T, WorkerError>;

#[derive(Debug, Error)]
pub enum WorkerError {
    #[error("Segment job query failed: {0}")]
    JobQuery(String),

    #[error("Segmentation job {job_id} reported status {status}")]
    JobFailed { job_id: String, status: String },

    #[error("Publish abandoned after {attempts} attempts: {last_error}")]
    PublishExhausted { attempts: u32, last_error: String },

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Storage error: {0}")]
    Storage(#[from] kada_storage::StorageError),

    #[error("Record error: {0}")]
    Records(#[from] kada_records::RecordError),

    #[error("Queue error: {0}")]
    Queue(#[from] kada_queue::QueueError),

    #[error("Media error: {0}")]
    Media(#[from] kada_media::MediaError),

    #[error("Model error: {0}")]
    Model(#[from] kada_models::ModelError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl WorkerError {
    pub fn job_query(msg: impl Into<String>) -> Self {
        Self::JobQuery(msg.into())
    }

    pub fn job_failed(job_id: impl Into<String>, status: impl Into<String>) -> Self {
        Self::JobFailed {
            job_id: job_id.into(),
            status: status.into(),
        }
    }

    pub fn config_error(msg: impl Into<String>) -> Self {
        Self::ConfigError(msg.into())
    }
}
