//! Timecode parsing and normalization utilities.
//!
//! Two formats travel through the pipeline:
//! - SMPTE timecodes from the segmentation job (`HH:MM:SS:FF`, or
//!   `HH:MM:SS;FF` for drop-frame rates)
//! - Subtitle timecodes (`HH:MM:SS,mmm`)

use crate::error::{ModelError, ModelResult};

/// Number of colon-delimited fields in a full SMPTE timecode.
const SMPTE_FIELDS: usize = 4;

/// Drop the trailing frame field of an SMPTE timecode.
///
/// `00:01:00:12` becomes `00:01:00`. A timecode that already has no frame
/// field is returned unchanged, so the operation is idempotent.
///
/// # Examples
/// ```
/// use kada_models::timecode::strip_frames;
/// assert_eq!(strip_frames("00:00:53:08"), "00:00:53");
/// assert_eq!(strip_frames("00:00:53;08"), "00:00:53");
/// assert_eq!(strip_frames("00:00:53"), "00:00:53");
/// ```
pub fn strip_frames(tc: &str) -> String {
    let tc = tc.trim();
    let fields = tc.split([':', ';']).count();
    if fields < SMPTE_FIELDS {
        return tc.to_string();
    }

    match tc.rfind([':', ';']) {
        Some(idx) => tc[..idx].to_string(),
        None => tc.to_string(),
    }
}

/// Parse a subtitle timecode (`HH:MM:SS,mmm`) into milliseconds.
///
/// A `.` is accepted in place of the `,` millisecond separator.
pub fn parse_subtitle_timecode(tc: &str) -> ModelResult<u64> {
    let tc = tc.trim();
    let parts: Vec<&str> = tc.split([':', ',', '.']).collect();
    if parts.len() != 4 {
        return Err(ModelError::invalid_timecode(tc));
    }

    let mut values = [0u64; 4];
    for (slot, part) in values.iter_mut().zip(&parts) {
        *slot = part
            .parse()
            .map_err(|_| ModelError::invalid_timecode(tc))?;
    }
    let [hours, minutes, seconds, millis] = values;

    if minutes >= 60 || seconds >= 60 || millis >= 1000 {
        return Err(ModelError::invalid_timecode(tc));
    }

    Ok(hours * 3_600_000 + minutes * 60_000 + seconds * 1_000 + millis)
}

/// Format milliseconds as a subtitle timecode (`HH:MM:SS,mmm`).
pub fn format_subtitle_timecode(ms: u64) -> String {
    let hours = ms / 3_600_000;
    let minutes = (ms % 3_600_000) / 60_000;
    let seconds = (ms % 60_000) / 1_000;
    let millis = ms % 1_000;

    format!("{:02}:{:02}:{:02},{:03}", hours, minutes, seconds, millis)
}
