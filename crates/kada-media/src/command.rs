//! FFmpeg command builder and runner.

use std::borrow::Cow;
use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::Command;
use tracing::{debug, warn};

use crate::error::{MediaError, MediaResult};

/// Default time budget of a single FFmpeg invocation.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(600);

/// Number of stderr lines kept for error reports.
const STDERR_TAIL_LINES: usize = 20;

/// One FFmpeg input: a file path, a URL or a lavfi graph, plus the options
/// that go before its `-i`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FfmpegInput {
    args: Vec<String>,
    source: String,
}

impl FfmpegInput {
    /// Input read from a path or URL.
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            args: Vec::new(),
            source: source.into(),
        }
    }

    /// Input read from a local file.
    pub fn file(path: impl AsRef<Path>) -> Self {
        Self::new(path.as_ref().to_string_lossy().to_string())
    }

    /// Input generated by a lavfi source graph (e.g. `anullsrc`).
    pub fn lavfi(graph: impl Into<String>) -> Self {
        Self::new(graph).arg("-f").arg("lavfi")
    }

    /// Add an input option.
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Seek to a position before reading (`-ss`). Accepts `HH:MM:SS` or seconds.
    pub fn seek(self, position: impl Into<String>) -> Self {
        self.arg("-ss").arg(position)
    }

    /// Limit how much of the input is read (`-t`).
    pub fn duration(self, duration: impl Into<String>) -> Self {
        self.arg("-t").arg(duration)
    }

    pub fn source(&self) -> &str {
        &self.source
    }
}

/// Builder for FFmpeg commands.
#[derive(Debug, Clone)]
pub struct FfmpegCommand {
    /// Inputs in `-i` order
    inputs: Vec<FfmpegInput>,
    /// Output file path
    output: PathBuf,
    /// Output arguments (after the last -i)
    output_args: Vec<String>,
    /// Whether to overwrite output
    overwrite: bool,
    /// Log level
    log_level: String,
}

impl FfmpegCommand {
    /// Create a command with a single input.
    pub fn new(input: impl Into<String>, output: impl AsRef<Path>) -> Self {
        Self::with_output(output).input(FfmpegInput::new(input))
    }

    /// Create a command without inputs; add them with [`FfmpegCommand::input`].
    pub fn with_output(output: impl AsRef<Path>) -> Self {
        Self {
            inputs: Vec::new(),
            output: output.as_ref().to_path_buf(),
            output_args: Vec::new(),
            overwrite: true,
            log_level: "error".to_string(),
        }
    }

    /// Append an input.
    pub fn input(mut self, input: FfmpegInput) -> Self {
        self.inputs.push(input);
        self
    }

    /// Add an option to the most recently added input.
    pub fn input_arg(mut self, arg: impl Into<String>) -> Self {
        if let Some(last) = self.inputs.pop() {
            self.inputs.push(last.arg(arg));
        }
        self
    }

    /// Seek the most recently added input.
    pub fn seek(self, position: impl Into<String>) -> Self {
        self.input_arg("-ss").input_arg(position)
    }

    /// Limit the duration read from the most recently added input.
    pub fn duration(self, duration: impl Into<String>) -> Self {
        self.input_arg("-t").input_arg(duration)
    }

    /// Add output arguments (after -i).
    pub fn output_arg(mut self, arg: impl Into<String>) -> Self {
        self.output_args.push(arg.into());
        self
    }

    /// Add multiple output arguments.
    pub fn output_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.output_args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Set video filter.
    pub fn video_filter(self, filter: impl Into<String>) -> Self {
        self.output_arg("-vf").output_arg(filter)
    }

    /// Set filter complex.
    pub fn filter_complex(self, filter: impl Into<String>) -> Self {
        self.output_arg("-filter_complex").output_arg(filter)
    }

    /// Map a stream or filter label into the output.
    pub fn map(self, label: impl Into<String>) -> Self {
        self.output_arg("-map").output_arg(label)
    }

    /// Set video codec.
    pub fn video_codec(self, codec: impl Into<String>) -> Self {
        self.output_arg("-c:v").output_arg(codec)
    }

    /// Set audio codec.
    pub fn audio_codec(self, codec: impl Into<String>) -> Self {
        self.output_arg("-c:a").output_arg(codec)
    }

    /// Copy both streams without re-encoding.
    pub fn codec_copy(self) -> Self {
        self.video_codec("copy").audio_codec("copy")
    }

    /// Set audio bitrate.
    pub fn audio_bitrate(self, bitrate: impl Into<String>) -> Self {
        self.output_arg("-b:a").output_arg(bitrate)
    }

    /// Loop the output forever (GIF).
    pub fn loop_forever(self) -> Self {
        self.output_arg("-loop").output_arg("0")
    }

    /// Set log level.
    pub fn log_level(mut self, level: impl Into<String>) -> Self {
        self.log_level = level.into();
        self
    }

    pub fn output(&self) -> &Path {
        &self.output
    }

    pub fn inputs(&self) -> &[FfmpegInput] {
        &self.inputs
    }

    /// Build the command arguments.
    pub fn build_args(&self) -> Vec<String> {
        let mut args = Vec::new();

        if self.overwrite {
            args.push("-y".to_string());
        }

        args.push("-nostdin".to_string());
        args.push("-v".to_string());
        args.push(self.log_level.clone());

        for input in &self.inputs {
            args.extend(input.args.iter().cloned());
            args.push("-i".to_string());
            args.push(input.source.clone());
        }

        args.extend(self.output_args.iter().cloned());
        args.push(self.output.to_string_lossy().to_string());

        args
    }
}

/// Runner for FFmpeg commands. Every run is bounded by a timeout.
#[derive(Debug, Clone)]
pub struct FfmpegRunner {
    timeout: Duration,
}

impl Default for FfmpegRunner {
    fn default() -> Self {
        Self::new()
    }
}

impl FfmpegRunner {
    /// Create a runner with [`DEFAULT_TIMEOUT`].
    pub fn new() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Set timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Run an FFmpeg command to completion.
    ///
    /// A non-zero exit yields [`MediaError::FfmpegFailed`] with the tail of
    /// stderr; exceeding the timeout kills the process and yields
    /// [`MediaError::Timeout`].
    pub async fn run(&self, cmd: &FfmpegCommand) -> MediaResult<()> {
        check_ffmpeg()?;

        let args = cmd.build_args();
        debug!("Running FFmpeg: ffmpeg {}", loggable_args(&args));

        let mut child = Command::new("ffmpeg")
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()?;

        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| MediaError::ffmpeg_failed("stderr not captured", None, None))?;

        // Drain stderr so the child never blocks on a full pipe.
        let stderr_task = tokio::spawn(async move {
            let mut reader = BufReader::new(stderr).lines();
            let mut tail = VecDeque::with_capacity(STDERR_TAIL_LINES);
            while let Ok(Some(line)) = reader.next_line().await {
                if tail.len() == STDERR_TAIL_LINES {
                    tail.pop_front();
                }
                tail.push_back(line);
            }
            Vec::from(tail).join("\n")
        });

        let waited = tokio::time::timeout(self.timeout, child.wait()).await;
        let status = match waited {
            Ok(status) => status?,
            Err(_) => {
                warn!(
                    "FFmpeg timed out after {} seconds, killing process",
                    self.timeout.as_secs()
                );
                let _ = child.kill().await;
                stderr_task.abort();
                return Err(MediaError::Timeout(self.timeout.as_secs()));
            }
        };

        let stderr = stderr_task.await.unwrap_or_default();

        if status.success() {
            Ok(())
        } else {
            Err(MediaError::ffmpeg_failed(
                "FFmpeg exited with non-zero status",
                Some(stderr).filter(|s| !s.is_empty()),
                status.code(),
            ))
        }
    }
}

/// Drop the query string of URL arguments; presigned URLs carry credentials there.
fn redact_url(arg: &str) -> Cow<'_, str> {
    let is_url = arg.starts_with("http://") || arg.starts_with("https://");
    match arg.find('?') {
        Some(idx) if is_url => Cow::Owned(format!("{}?<redacted>", &arg[..idx])),
        _ => Cow::Borrowed(arg),
    }
}

fn loggable_args(args: &[String]) -> String {
    args.iter().map(|a| redact_url(a)).collect::<Vec<_>>().join(" ")
}

/// Check if FFmpeg is available.
pub fn check_ffmpeg() -> MediaResult<PathBuf> {
    which::which("ffmpeg").map_err(|_| MediaError::FfmpegNotFound)
}

/// Check if FFprobe is available.
pub fn check_ffprobe() -> MediaResult<PathBuf> {
    which::which("ffprobe").map_err(|_| MediaError::FfprobeNotFound)
}
