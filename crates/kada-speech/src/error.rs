//! Speech error types.

use std::path::PathBuf;
use thiserror::Error;

/// Result type for speech operations.
pub type SpeechResult<T> = Result<T, SpeechError>;

#[derive(Debug, Error)]
pub enum SpeechError {
    #[error("Unsupported file format: {0} (use .srt or .txt)")]
    UnsupportedFormat(PathBuf),

    #[error("Subtitle parse error: {0}")]
    Parse(String),

    #[error("Speech synthesis failed: {0}")]
    Synthesis(String),

    #[error("Model error: {0}")]
    Model(#[from] kada_models::ModelError),

    #[error("Media error: {0}")]
    Media(#[from] kada_media::MediaError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl SpeechError {
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse(msg.into())
    }

    pub fn synthesis(msg: impl Into<String>) -> Self {
        Self::Synthesis(msg.into())
    }
}
