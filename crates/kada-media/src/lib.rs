//! FFmpeg CLI wrapper for the Kada pipeline.
//!
//! This crate provides:
//! - Type-safe FFmpeg command building (file, URL and lavfi inputs)
//! - A runner that enforces a timeout on every invocation
//! - Lossless sub-clip slicing and palette-optimized GIF rendering
//! - Audio duration probing and aligned-timeline rendering

pub mod audio;
pub mod clip;
pub mod command;
pub mod error;
pub mod gif;
pub mod probe;
pub mod transcoder;

pub use audio::{build_timeline_command, plan_timeline, render_timeline, MAX_PIECES_PER_PASS};
pub use clip::slice_clip;
pub use command::{check_ffmpeg, check_ffprobe, FfmpegCommand, FfmpegInput, FfmpegRunner};
pub use error::{MediaError, MediaResult};
pub use gif::{render_gif, GifSpec};
pub use probe::probe_duration_ms;
pub use transcoder::{ClipTranscoder, FfmpegTranscoder};
