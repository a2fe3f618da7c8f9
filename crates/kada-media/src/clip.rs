//! Sub-clip slicing.

use std::path::Path;
use tracing::info;

use crate::command::{FfmpegCommand, FfmpegRunner};
use crate::error::MediaResult;

/// Cut `[start, start + duration)` out of `source` without re-encoding.
///
/// `source` may be a local path or a (signed) URL; `start` and `duration`
/// are `HH:MM:SS` timecodes.
pub async fn slice_clip(
    runner: &FfmpegRunner,
    source: &str,
    start: &str,
    duration: &str,
    output: &Path,
) -> MediaResult<()> {
    info!(
        "Slicing clip -> {} (start: {}, duration: {})",
        output.display(),
        start,
        duration
    );

    runner.run(&clip_command(source, start, duration, output)).await
}

pub(crate) fn clip_command(source: &str, start: &str, duration: &str, output: &Path) -> FfmpegCommand {
    FfmpegCommand::new(source, output)
        .seek(start)
        .duration(duration)
        .codec_copy()
}
