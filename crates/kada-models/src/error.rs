//! Model error types.

use thiserror::Error;

/// Result type for model parsing and validation.
pub type ModelResult<T> = Result<T, ModelError>;

/// Errors raised while decoding or validating pipeline payloads.
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("Invalid timecode: {0}")]
    InvalidTimecode(String),

    #[error("Missing field: {0}")]
    MissingField(&'static str),

    #[error("Invalid object key: {0}")]
    InvalidKey(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ModelError {
    pub fn invalid_timecode(tc: impl Into<String>) -> Self {
        Self::InvalidTimecode(tc.into())
    }

    pub fn invalid_key(key: impl Into<String>) -> Self {
        Self::InvalidKey(key.into())
    }
}
