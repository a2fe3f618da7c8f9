//! Animated GIF previews.

use std::path::Path;
use tracing::info;

use crate::command::{FfmpegCommand, FfmpegRunner};
use crate::error::MediaResult;

/// Output parameters of a GIF preview.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GifSpec {
    /// Frames per second
    pub fps: u32,
    /// Output width in pixels; height follows the aspect ratio
    pub width: u32,
}

impl Default for GifSpec {
    fn default() -> Self {
        Self { fps: 10, width: 240 }
    }
}

impl GifSpec {
    /// Downsample, scale and build a dedicated palette in one filter graph.
    pub fn filter(&self) -> String {
        format!(
            "fps={},scale={}:-1:flags=lanczos,split[s0][s1];[s0]palettegen[p];[s1][p]paletteuse",
            self.fps, self.width
        )
    }
}

/// Render a looping GIF of `[start, start + duration)` of `source`.
pub async fn render_gif(
    runner: &FfmpegRunner,
    source: &str,
    start: &str,
    duration: &str,
    output: &Path,
    spec: &GifSpec,
) -> MediaResult<()> {
    info!(
        "Rendering GIF -> {} (start: {}, duration: {}, {}fps, {}px)",
        output.display(),
        start,
        duration,
        spec.fps,
        spec.width
    );

    runner.run(&gif_command(source, start, duration, output, spec)).await
}

pub(crate) fn gif_command(
    source: &str,
    start: &str,
    duration: &str,
    output: &Path,
    spec: &GifSpec,
) -> FfmpegCommand {
    FfmpegCommand::new(source, output)
        .seek(start)
        .duration(duration)
        .video_filter(spec.filter())
        .loop_forever()
}
