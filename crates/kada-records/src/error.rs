//! Record store error types.

use thiserror::Error;

/// Result type for record store operations.
pub type RecordResult<T> = Result<T, RecordError>;

/// Errors that can occur while updating media records.
#[derive(Debug, Error)]
pub enum RecordError {
    #[error("Update failed for record {key}: {message}")]
    UpdateFailed { key: String, message: String },
}

impl RecordError {
    pub fn update_failed(key: impl Into<String>, message: impl Into<String>) -> Self {
        Self::UpdateFailed {
            key: key.into(),
            message: message.into(),
        }
    }
}
