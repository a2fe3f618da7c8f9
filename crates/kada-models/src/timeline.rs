//! Aligned audio timeline.
//!
//! The timeline is an append-only list of pieces. Rendering it to a single
//! audio file is the media layer's job.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// One piece of the output timeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TimelinePiece {
    /// Silence of the given length
    Silence { duration_ms: u64 },
    /// The first `duration_ms` of a synthesized audio file
    Speech {
        cue_index: usize,
        path: PathBuf,
        duration_ms: u64,
    },
}

impl TimelinePiece {
    pub fn duration_ms(&self) -> u64 {
        match self {
            TimelinePiece::Silence { duration_ms } => *duration_ms,
            TimelinePiece::Speech { duration_ms, .. } => *duration_ms,
        }
    }
}

/// Accumulated audio output of one alignment run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AudioTimeline {
    pieces: Vec<TimelinePiece>,
}

impl AudioTimeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a silence run. Zero-length runs are not recorded.
    pub fn push_silence(&mut self, duration_ms: u64) {
        if duration_ms > 0 {
            self.pieces.push(TimelinePiece::Silence { duration_ms });
        }
    }

    /// Append the first `duration_ms` of a synthesized file.
    pub fn push_speech(&mut self, cue_index: usize, path: impl Into<PathBuf>, duration_ms: u64) {
        self.pieces.push(TimelinePiece::Speech {
            cue_index,
            path: path.into(),
            duration_ms,
        });
    }

    pub fn pieces(&self) -> &[TimelinePiece] {
        &self.pieces
    }

    pub fn is_empty(&self) -> bool {
        self.pieces.is_empty()
    }

    /// Total length of the timeline.
    pub fn duration_ms(&self) -> u64 {
        self.pieces.iter().map(TimelinePiece::duration_ms).sum()
    }

    /// Total length of all silence runs.
    pub fn silence_ms(&self) -> u64 {
        self.pieces
            .iter()
            .filter(|p| matches!(p, TimelinePiece::Silence { .. }))
            .map(TimelinePiece::duration_ms)
            .sum()
    }
}
