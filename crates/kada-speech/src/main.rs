//! `kada-tts`: turn a subtitle file into a synchronized speech track.

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::{CommandFactory, Parser};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use kada_media::FfmpegRunner;
use kada_speech::{PollyConfig, PollySynthesizer, SpeechAligner, SynthesisFailurePolicy};

const USAGE_INSTRUCTIONS: &str = "\
Usage Instructions:
1. Install ffmpeg and make sure ffmpeg and ffprobe are on your PATH.
2. Configure AWS credentials (environment, shared config or an attached role).
3. Run: kada-tts <path_to_subtitle_file> <voice_id> [--debug]
   Example: kada-tts subtitles.srt Joanna
   Supported formats: .srt and .txt
4. Voice IDs include:
   - Matthew (US English, Male)
   - Ruth (US English, Female)
5. Output is saved as '<input_file_name>_synced.mp3' in the same directory.
6. Use --debug to enable detailed logging.";

#[derive(Parser, Debug)]
#[command(name = "kada-tts", version, about = "Convert subtitles to synchronized speech")]
struct Cli {
    /// Subtitle file (.srt or .txt)
    subtitle_file: Option<PathBuf>,

    /// Polly voice, e.g. Joanna
    voice_id: Option<String>,

    /// Enable detailed logging
    #[arg(long)]
    debug: bool,

    /// Show usage instructions
    #[arg(long)]
    help_usage: bool,

    /// Do not advance the playhead past cues whose synthesis failed
    #[arg(long)]
    hold_playhead: bool,
}

fn init_tracing(debug: bool) {
    let use_json = std::env::var("LOG_FORMAT")
        .map(|v| v.to_lowercase() == "json")
        .unwrap_or(false);

    let default_level = if debug { "debug" } else { "warn" };
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    if use_json {
        tracing_subscriber::registry()
            .with(fmt::layer().json())
            .with(env_filter)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(fmt::layer().with_ansi(true).with_target(debug))
            .with(env_filter)
            .init();
    }
}

fn progress_bar(debug: bool) -> ProgressBar {
    if debug {
        // Log lines and a redrawn bar interleave badly.
        return ProgressBar::hidden();
    }
    let pb = ProgressBar::new(0);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap()
            .progress_chars("█▉▊▋▌▍▎▏ "),
    );
    pb.set_message("Processing subtitles");
    pb
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    if cli.help_usage {
        println!("{}", USAGE_INSTRUCTIONS);
        return ExitCode::SUCCESS;
    }

    let (Some(subtitle_file), Some(voice_id)) = (cli.subtitle_file.clone(), cli.voice_id.clone()) else {
        eprintln!("Error: Missing required arguments. Use --help-usage for instructions.");
        let _ = Cli::command().print_help();
        return ExitCode::from(2);
    };

    init_tracing(cli.debug);

    match run(&cli, &subtitle_file, &voice_id).await {
        Ok(output) => {
            println!("Synchronized speech saved to {}", output.display());
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("{:#}", e);
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: &Cli, subtitle_file: &std::path::Path, voice_id: &str) -> anyhow::Result<PathBuf> {
    let sdk_config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
    let polly_config = PollyConfig::from_env();
    info!("Synthesizing {} with voice {} ({} engine)", subtitle_file.display(), voice_id, polly_config.engine);

    let policy = if cli.hold_playhead {
        SynthesisFailurePolicy::HoldPlayhead
    } else {
        SynthesisFailurePolicy::CommitSilence
    };

    let aligner = SpeechAligner::new(
        Arc::new(PollySynthesizer::new(&sdk_config, polly_config)),
        FfmpegRunner::new(),
    )
    .with_policy(policy)
    .with_progress(progress_bar(cli.debug));

    Ok(aligner.align(subtitle_file, voice_id).await?)
}
