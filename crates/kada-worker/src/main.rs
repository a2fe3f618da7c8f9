//! Kada worker binary.
//!
//! One invocation handles one trigger payload, read from a file or stdin:
//! - `resolve`: a queue delivery of segmentation notifications
//! - `render`: a shots-and-GIF event

use std::io::Read;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use metrics_exporter_prometheus::PrometheusBuilder;
use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use kada_media::{FfmpegRunner, FfmpegTranscoder, GifSpec};
use kada_models::{EventEnvelope, QueueBatch};
use kada_queue::{EventBridgePublisher, SqsQueue};
use kada_records::DynamoRecordStore;
use kada_storage::{S3Client, S3Config};
use kada_worker::{
    ClipRenderer, PublishPolicy, RecordOutcome, RekognitionSegmentQuery, RenderConfig,
    RenderHandler, ResolveHandler, SegmentResolver, WorkerConfig,
};

#[derive(Parser, Debug)]
#[command(name = "kada-worker", version, about = "Segment resolver and clip renderer")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Resolve segments of finished jobs and publish them
    Resolve {
        /// Queue delivery JSON (`{"Records": [...]}`); stdin when omitted
        #[arg(short, long)]
        input: Option<PathBuf>,
    },
    /// Slice clips and render GIFs for a shots-and-GIF event
    Render {
        /// Event JSON; stdin when omitted
        #[arg(short, long)]
        input: Option<PathBuf>,
    },
}

fn init_tracing() {
    let use_json = std::env::var("LOG_FORMAT")
        .map(|v| v.to_lowercase() == "json")
        .unwrap_or(false);

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("kada=info,info"));

    if use_json {
        tracing_subscriber::registry()
            .with(fmt::layer().json())
            .with(env_filter)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .with_ansi(true)
                    .with_target(true)
                    .with_thread_ids(false)
                    .with_file(false)
                    .with_line_number(false),
            )
            .with(env_filter)
            .init();
    }
}

fn read_input(input: Option<&PathBuf>) -> anyhow::Result<String> {
    match input {
        Some(path) => std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display())),
        None => {
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf).context("reading stdin")?;
            Ok(buf)
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let cli = Cli::parse();
    let config = WorkerConfig::from_env();
    info!("Starting kada-worker");
    info!("Worker config: {:?}", config);

    if let Some(port) = config.metrics_port {
        PrometheusBuilder::new()
            .with_http_listener(([0, 0, 0, 0], port))
            .install()
            .context("installing Prometheus exporter")?;
        info!("Metrics exporter listening on port {}", port);
    }

    let sdk_config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;

    match cli.command {
        Command::Resolve { input } => {
            let batch = QueueBatch::from_json(&read_input(input.as_ref())?)?;

            let queue = Arc::new(SqsQueue::new(&sdk_config, config.queue_config()?));
            let resolver = SegmentResolver::new(Arc::new(RekognitionSegmentQuery::new(&sdk_config)), &config);
            let handler = ResolveHandler::new(
                queue,
                resolver,
                Arc::new(EventBridgePublisher::new(&sdk_config)),
                PublishPolicy::from_config(&config),
                config.event_bus_name.clone(),
            );

            let outcomes = handler.handle_records(&batch.records).await;
            let failed = outcomes
                .iter()
                .filter(|o| match o {
                    RecordOutcome::Failed { .. } => true,
                    RecordOutcome::Published { report, .. } => !report.delivered,
                    RecordOutcome::Skipped { .. } => false,
                })
                .count();

            info!("Handled {} records, {} failed", outcomes.len(), failed);
            if failed > 0 {
                anyhow::bail!("{} of {} records failed", failed, outcomes.len());
            }
        }
        Command::Render { input } => {
            let envelope = EventEnvelope::from_json(&read_input(input.as_ref())?)?;

            let storage = Arc::new(S3Client::new(&sdk_config, &S3Config::from_env()));
            let records = Arc::new(DynamoRecordStore::new(&sdk_config, config.record_store_config()?));
            let transcoder = Arc::new(FfmpegTranscoder::new(
                FfmpegRunner::new().with_timeout(config.ffmpeg_timeout),
                GifSpec::default(),
            ));
            let renderer = ClipRenderer::new(storage, records, transcoder, RenderConfig::from_config(&config));

            match RenderHandler::new(renderer).handle_event(&envelope).await {
                Ok(Some(report)) => info!(
                    "Rendered {} segments: {} artifacts uploaded, {} skipped",
                    report.video_paths.len(),
                    report.uploaded(),
                    report.failures.len()
                ),
                Ok(None) => {}
                Err(e) => {
                    error!("Render failed: {}", e);
                    return Err(e.into());
                }
            }
        }
    }

    Ok(())
}
