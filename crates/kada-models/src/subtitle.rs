//! Subtitle cues.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::timecode::format_subtitle_timecode;

/// One timed line of a subtitle track.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubtitleCue {
    /// Sequence number as written in the source
    pub index: usize,
    pub start_ms: u64,
    pub end_ms: u64,
    pub text: String,
}

impl SubtitleCue {
    pub fn new(index: usize, start_ms: u64, end_ms: u64, text: impl Into<String>) -> Self {
        Self {
            index,
            start_ms,
            end_ms,
            text: text.into(),
        }
    }

    /// Nominal length of the cue window. Zero for inverted windows.
    pub fn window_ms(&self) -> u64 {
        self.end_ms.saturating_sub(self.start_ms)
    }
}

impl fmt::Display for SubtitleCue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.index)?;
        writeln!(
            f,
            "{} --> {}",
            format_subtitle_timecode(self.start_ms),
            format_subtitle_timecode(self.end_ms)
        )?;
        writeln!(f, "{}", self.text)
    }
}
