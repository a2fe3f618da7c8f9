//! Transcoding seam used by the clip renderer.

use async_trait::async_trait;
use std::path::Path;

use crate::clip::slice_clip;
use crate::command::FfmpegRunner;
use crate::error::MediaResult;
use crate::gif::{render_gif, GifSpec};

/// Produces the two derived artifacts of a segment.
#[async_trait]
pub trait ClipTranscoder: Send + Sync {
    /// Cut a sub-clip of `source` into `output`.
    async fn slice_clip(&self, source: &str, start: &str, duration: &str, output: &Path) -> MediaResult<()>;

    /// Render a looping animation of the same bounds into `output`.
    async fn render_gif(&self, source: &str, start: &str, duration: &str, output: &Path) -> MediaResult<()>;
}

/// [`ClipTranscoder`] backed by the FFmpeg CLI.
#[derive(Debug, Clone, Default)]
pub struct FfmpegTranscoder {
    runner: FfmpegRunner,
    gif: GifSpec,
}

impl FfmpegTranscoder {
    pub fn new(runner: FfmpegRunner, gif: GifSpec) -> Self {
        Self { runner, gif }
    }
}

#[async_trait]
impl ClipTranscoder for FfmpegTranscoder {
    async fn slice_clip(&self, source: &str, start: &str, duration: &str, output: &Path) -> MediaResult<()> {
        slice_clip(&self.runner, source, start, duration, output).await
    }

    async fn render_gif(&self, source: &str, start: &str, duration: &str, output: &Path) -> MediaResult<()> {
        render_gif(&self.runner, source, start, duration, output, &self.gif).await
    }
}
