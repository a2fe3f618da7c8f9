//! Rendering of an aligned audio timeline into one MP3 file.
//!
//! Every piece becomes one FFmpeg input: silence runs are generated with
//! `anullsrc`, speech pieces are trimmed with `atrim`. All pieces are brought
//! to the same sample format and joined with the `concat` filter.
//!
//! A pass takes at most [`MAX_PIECES_PER_PASS`] inputs, which bounds both the
//! filter graph argument and the number of open files. Longer timelines are
//! rendered in parts to lossless WAV files, and the parts are joined the same
//! way until a single pass remains.

use std::path::{Path, PathBuf};
use tracing::{debug, info};

use kada_models::{AudioTimeline, TimelinePiece};

use crate::command::{FfmpegCommand, FfmpegInput, FfmpegRunner};
use crate::error::{MediaError, MediaResult};

const SAMPLE_RATE: u32 = 24_000;
const OUTPUT_BITRATE: &str = "64k";

/// Inputs per FFmpeg invocation.
pub const MAX_PIECES_PER_PASS: usize = 256;

fn secs(ms: u64) -> String {
    format!("{}.{:03}", ms / 1000, ms % 1000)
}

/// How a pass encodes its output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PassOutput {
    /// Intermediate part, PCM so joins add no codec padding
    Part,
    Final,
}

fn pass_command(pieces: &[TimelinePiece], output: &Path, kind: PassOutput) -> FfmpegCommand {
    let normalize = format!(
        "aresample={},aformat=sample_fmts=fltp:channel_layouts=mono",
        SAMPLE_RATE
    );

    let mut cmd = FfmpegCommand::with_output(output);
    let mut graph = String::new();
    let mut labels = String::new();

    for (i, piece) in pieces.iter().enumerate() {
        match piece {
            TimelinePiece::Silence { duration_ms } => {
                cmd = cmd.input(
                    FfmpegInput::lavfi(format!("anullsrc=r={}:cl=mono", SAMPLE_RATE))
                        .duration(secs(*duration_ms)),
                );
                graph.push_str(&format!("[{i}:a]{normalize}[a{i}];"));
            }
            TimelinePiece::Speech { path, duration_ms, .. } => {
                cmd = cmd.input(FfmpegInput::file(path));
                graph.push_str(&format!(
                    "[{i}:a]atrim=end={},asetpts=PTS-STARTPTS,{normalize}[a{i}];",
                    secs(*duration_ms)
                ));
            }
        }
        labels.push_str(&format!("[a{i}]"));
    }

    graph.push_str(&format!("{labels}concat=n={}:v=0:a=1[out]", pieces.len()));

    let cmd = cmd.filter_complex(graph).map("[out]");
    match kind {
        PassOutput::Part => cmd.audio_codec("pcm_s16le"),
        PassOutput::Final => cmd.audio_codec("libmp3lame").audio_bitrate(OUTPUT_BITRATE),
    }
}

/// Build the single FFmpeg command that renders `timeline` into `output`.
///
/// Fails for timelines longer than [`MAX_PIECES_PER_PASS`]; use
/// [`plan_timeline`] for those.
pub fn build_timeline_command(timeline: &AudioTimeline, output: &Path) -> MediaResult<FfmpegCommand> {
    match timeline.pieces().len() {
        0 => Err(MediaError::EmptyTimeline),
        n if n > MAX_PIECES_PER_PASS => Err(MediaError::invalid_media(format!(
            "timeline has {} pieces, more than {} per pass",
            n, MAX_PIECES_PER_PASS
        ))),
        _ => Ok(pass_command(timeline.pieces(), output, PassOutput::Final)),
    }
}

/// Plan the FFmpeg passes that render `timeline` into `output`, in run order.
///
/// Intermediate parts are written to `parts_dir`. The last command always
/// writes `output`.
pub fn plan_timeline(timeline: &AudioTimeline, output: &Path, parts_dir: &Path) -> MediaResult<Vec<FfmpegCommand>> {
    if timeline.is_empty() {
        return Err(MediaError::EmptyTimeline);
    }

    let mut commands = Vec::new();
    let mut pieces = timeline.pieces().to_vec();
    let mut round = 0;

    while pieces.len() > MAX_PIECES_PER_PASS {
        let mut parts = Vec::with_capacity(pieces.len().div_ceil(MAX_PIECES_PER_PASS));
        for (i, chunk) in pieces.chunks(MAX_PIECES_PER_PASS).enumerate() {
            let path: PathBuf = parts_dir.join(format!("part-{round}-{i:05}.wav"));
            commands.push(pass_command(chunk, &path, PassOutput::Part));
            parts.push(TimelinePiece::Speech {
                cue_index: i,
                path,
                duration_ms: chunk.iter().map(TimelinePiece::duration_ms).sum(),
            });
        }
        debug!("Timeline round {}: {} pieces into {} parts", round, pieces.len(), parts.len());
        pieces = parts;
        round += 1;
    }

    commands.push(pass_command(&pieces, output, PassOutput::Final));
    Ok(commands)
}

/// Render `timeline` into an MP3 file at `output`.
///
/// Intermediate parts live in a scratch directory beside `output` that is
/// removed when rendering ends.
pub async fn render_timeline(runner: &FfmpegRunner, timeline: &AudioTimeline, output: &Path) -> MediaResult<()> {
    let parent = match output.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let parts_dir = tempfile::Builder::new().prefix(".timeline-").tempdir_in(parent)?;
    let commands = plan_timeline(timeline, output, parts_dir.path())?;

    info!(
        "Rendering audio timeline -> {} ({} pieces, {}ms, {} passes)",
        output.display(),
        timeline.pieces().len(),
        timeline.duration_ms(),
        commands.len()
    );

    for cmd in &commands {
        runner.run(cmd).await?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_secs_formatting() {
        assert_eq!(secs(0), "0.000");
        assert_eq!(secs(1_005), "1.005");
        assert_eq!(secs(62_500), "62.500");
    }

    #[test]
    fn test_empty_timeline_is_rejected() {
        let err = build_timeline_command(&AudioTimeline::new(), Path::new("out.mp3")).unwrap_err();
        assert!(matches!(err, MediaError::EmptyTimeline));
    }

    /// Feature-length subtitle track: 1,200 cues, each a gap and a line.
    fn long_timeline() -> AudioTimeline {
        let mut timeline = AudioTimeline::new();
        for cue in 1..=1_200 {
            timeline.push_silence(500);
            timeline.push_speech(cue, format!("/tmp/kada-tts-scratch/cue-{:05}.mp3", cue), 1_800);
        }
        timeline
    }

    #[test]
    fn test_long_timeline_is_rendered_in_bounded_passes() {
        let timeline = long_timeline();
        let output = Path::new("/data/film_synced.mp3");
        let commands = plan_timeline(&timeline, output, Path::new("/tmp/parts")).unwrap();

        // 2,400 pieces: ten parts, then one joining pass.
        assert_eq!(commands.len(), 11);
        for cmd in &commands {
            assert!(cmd.inputs().len() <= MAX_PIECES_PER_PASS);
            let longest = cmd.build_args().iter().map(String::len).max().unwrap();
            assert!(longest < 128 * 1024, "argument of {} bytes", longest);
        }

        let last = commands.last().unwrap();
        assert_eq!(last.output(), output);
        assert_eq!(last.inputs().len(), 10);
        assert!(last.build_args().contains(&"libmp3lame".to_string()));
        assert_eq!(commands[0].output(), Path::new("/tmp/parts/part-0-00000.wav"));
        assert!(commands[0].build_args().contains(&"pcm_s16le".to_string()));

        // Parts carry the exact length of the pieces they hold.
        let graph_at = last.build_args().iter().position(|a| a == "-filter_complex").unwrap();
        let graph = last.build_args()[graph_at + 1].clone();
        assert!(graph.starts_with(&format!("[0:a]atrim=end={}", secs(128 * 2_300))));
    }

    #[test]
    fn test_short_timeline_is_one_pass() {
        let mut timeline = AudioTimeline::new();
        timeline.push_speech(1, "/tmp/cue-1.mp3", 2_000);
        let commands = plan_timeline(&timeline, Path::new("out.mp3"), Path::new("/tmp/parts")).unwrap();
        assert_eq!(commands.len(), 1);
        assert!(matches!(
            build_timeline_command(&long_timeline(), Path::new("out.mp3")),
            Err(MediaError::InvalidMedia(_))
        ));
    }

    #[test]
    fn test_timeline_graph() {
        let mut timeline = AudioTimeline::new();
        timeline.push_speech(1, "/tmp/cue-1.mp3", 2_000);
        timeline.push_silence(1_000);
        timeline.push_speech(2, "/tmp/cue-2.mp3", 1_000);

        let args = build_timeline_command(&timeline, Path::new("out_synced.mp3"))
            .unwrap()
            .build_args();
        let graph_at = args.iter().position(|a| a == "-filter_complex").unwrap();
        let graph = &args[graph_at + 1];

        assert_eq!(args.iter().filter(|a| *a == "-i").count(), 3);
        assert!(graph.contains("[0:a]atrim=end=2.000,asetpts=PTS-STARTPTS"));
        assert!(graph.contains("[1:a]aresample=24000"));
        assert!(graph.contains("[2:a]atrim=end=1.000"));
        assert!(graph.ends_with("[a0][a1][a2]concat=n=3:v=0:a=1[out]"));
        assert!(args.join(" ").contains("-f lavfi -t 1.000 -i anullsrc=r=24000:cl=mono"));
        assert_eq!(args.last().unwrap(), "out_synced.mp3");
    }
}
