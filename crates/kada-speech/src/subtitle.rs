//! Subtitle cue parsing.
//!
//! Two input formats are understood:
//! - SRT: numbered blocks with `HH:MM:SS,mmm --> HH:MM:SS,mmm` timing
//! - Plain text: one cue per line, each given a fixed five-second window

use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use kada_models::timecode::parse_subtitle_timecode;
use kada_models::SubtitleCue;

use crate::error::{SpeechError, SpeechResult};

/// Window assigned to each line of a plain-text file.
pub const TXT_CUE_WINDOW_MS: u64 = 5_000;

static SRT_BLOCK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(\d+)\n(\d{2}:\d{2}:\d{2},\d{3}) --> (\d{2}:\d{2}:\d{2},\d{3})\n((?:.+(?:\n.+)*))\n\n").unwrap()
});

/// Supported subtitle formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CueFormat {
    Srt,
    Txt,
}

impl CueFormat {
    /// Pick the format from the file extension.
    pub fn from_path(path: &Path) -> SpeechResult<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);

        match ext.as_deref() {
            Some("srt") => Ok(CueFormat::Srt),
            Some("txt") => Ok(CueFormat::Txt),
            _ => Err(SpeechError::UnsupportedFormat(path.to_path_buf())),
        }
    }

    pub fn parse(&self, content: &str) -> SpeechResult<Vec<SubtitleCue>> {
        match self {
            CueFormat::Srt => parse_srt(content),
            CueFormat::Txt => Ok(parse_txt(content)),
        }
    }
}

/// Parse SRT content into cues, in file order.
///
/// Blocks that do not match the expected layout are skipped. Line endings
/// are normalized, and the final block does not need a trailing blank line.
pub fn parse_srt(content: &str) -> SpeechResult<Vec<SubtitleCue>> {
    let mut normalized = content.replace("\r\n", "\n");
    normalized.truncate(normalized.trim_end().len());
    normalized.push_str("\n\n");

    SRT_BLOCK
        .captures_iter(&normalized)
        .map(|caps| -> SpeechResult<SubtitleCue> {
            let index = caps[1]
                .parse::<usize>()
                .map_err(|e| SpeechError::parse(format!("cue number {}: {}", &caps[1], e)))?;
            let start_ms = parse_subtitle_timecode(&caps[2])?;
            let end_ms = parse_subtitle_timecode(&caps[3])?;
            Ok(SubtitleCue::new(index, start_ms, end_ms, &caps[4]))
        })
        .collect()
}

/// Parse plain text: line `i` (zero-based) covers `[5i, 5(i+1))` seconds.
///
/// Blank lines keep their window so later lines stay on schedule.
pub fn parse_txt(content: &str) -> Vec<SubtitleCue> {
    content
        .lines()
        .enumerate()
        .map(|(i, line)| {
            let start_ms = i as u64 * TXT_CUE_WINDOW_MS;
            SubtitleCue::new(i + 1, start_ms, start_ms + TXT_CUE_WINDOW_MS, line.trim())
        })
        .collect()
}

/// Read and parse a subtitle file.
pub async fn load_cues(path: &Path) -> SpeechResult<Vec<SubtitleCue>> {
    let format = CueFormat::from_path(path)?;
    let content = tokio::fs::read_to_string(path).await?;
    let cues = format.parse(&content)?;
    debug!("Parsed {} cues from {}", cues.len(), path.display());
    Ok(cues)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_SRT: &str = "1\n00:00:01,000 --> 00:00:03,000\nHello there.\n\n2\n00:00:04,500 --> 00:00:06,000\nSecond line\nwraps here.\n\n";

    #[test]
    fn test_parse_srt() {
        let cues = parse_srt(SAMPLE_SRT).unwrap();
        assert_eq!(cues.len(), 2);
        assert_eq!(cues[0], SubtitleCue::new(1, 1_000, 3_000, "Hello there."));
        assert_eq!(cues[1].start_ms, 4_500);
        assert_eq!(cues[1].end_ms, 6_000);
        assert_eq!(cues[1].text, "Second line\nwraps here.");
    }

    #[test]
    fn test_parse_srt_crlf_without_trailing_blank_line() {
        let content = "1\r\n00:00:00,000 --> 00:00:02,000\r\nOne\r\n\r\n2\r\n00:00:02,000 --> 00:00:04,000\r\nTwo";
        let cues = parse_srt(content).unwrap();
        assert_eq!(cues.len(), 2);
        assert_eq!(cues[1].text, "Two");
        assert_eq!(cues[1].window_ms(), 2_000);
    }

    #[test]
    fn test_parse_srt_skips_malformed_blocks() {
        let content = "1\n00:00:01 --> 00:00:02\nNo millis\n\n2\n00:00:03,000 --> 00:00:04,000\nKept\n\n";
        let cues = parse_srt(content).unwrap();
        assert_eq!(cues.len(), 1);
        assert_eq!(cues[0].index, 2);
    }

    #[test]
    fn test_parse_srt_rejects_out_of_range_timecode() {
        let content = "1\n00:00:61,000 --> 00:01:02,000\nBad seconds\n\n";
        assert!(matches!(parse_srt(content), Err(SpeechError::Model(_))));
    }

    #[test]
    fn test_parse_txt_windows() {
        let cues = parse_txt("  First line  \n\nThird line\n");
        assert_eq!(cues.len(), 3);
        assert_eq!(cues[0], SubtitleCue::new(1, 0, 5_000, "First line"));
        assert_eq!(cues[1].text, "");
        assert_eq!((cues[2].start_ms, cues[2].end_ms), (10_000, 15_000));
    }

    #[test]
    fn test_format_from_path() {
        assert_eq!(CueFormat::from_path(Path::new("a/b.srt")).unwrap(), CueFormat::Srt);
        assert_eq!(CueFormat::from_path(Path::new("notes.TXT")).unwrap(), CueFormat::Txt);
        assert!(matches!(
            CueFormat::from_path(Path::new("movie.vtt")),
            Err(SpeechError::UnsupportedFormat(_))
        ));
        assert!(CueFormat::from_path(Path::new("noext")).is_err());
    }

    #[tokio::test]
    async fn test_load_cues_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("talk.srt");
        std::fs::write(&path, SAMPLE_SRT).unwrap();

        let cues = load_cues(&path).await.unwrap();
        assert_eq!(cues.len(), 2);
    }
}
