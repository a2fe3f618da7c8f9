//! Clip and GIF rendering for resolved segments.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use tempfile::TempDir;
use tracing::{debug, info, warn};

use kada_media::ClipTranscoder;
use kada_models::{ClipArtifact, Segment, SlicedMediaRecord, SourceIdentity};
use kada_records::{RecordError, RecordStore};
use kada_storage::ObjectStore;

use crate::config::WorkerConfig;
use crate::error::WorkerResult;
use crate::logging::JobLogger;
use crate::metrics::record_artifact;

/// Renderer settings.
#[derive(Debug, Clone)]
pub struct RenderConfig {
    /// Parent of the per-run scratch directory
    pub work_dir: PathBuf,
    pub signed_url_ttl: Duration,
    pub identity: SourceIdentity,
}

impl RenderConfig {
    pub fn from_config(config: &WorkerConfig) -> Self {
        Self {
            work_dir: config.work_dir.clone(),
            signed_url_ttl: config.signed_url_ttl,
            identity: config.source_identity(),
        }
    }
}

/// The two artifacts derived from a segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactKind {
    Clip,
    Gif,
}

impl ArtifactKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ArtifactKind::Clip => "clip",
            ArtifactKind::Gif => "gif",
        }
    }
}

impl fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An artifact that could not be produced or stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactFailure {
    pub segment_key: String,
    pub kind: ArtifactKind,
    pub error: String,
}

/// Result of rendering one segment batch.
#[derive(Debug)]
pub struct RenderReport {
    /// Derived clip keys, one per segment, in segment order
    pub video_paths: Vec<String>,
    /// Derived GIF keys, one per segment, in segment order
    pub gif_paths: Vec<String>,
    /// Artifacts that were skipped
    pub failures: Vec<ArtifactFailure>,
    /// Key of the record that was updated
    pub record_key: String,
    /// Outcome of the record update
    pub record_update: Result<(), RecordError>,
}

impl RenderReport {
    /// Number of artifacts that reached storage.
    pub fn uploaded(&self) -> usize {
        (self.video_paths.len() + self.gif_paths.len()).saturating_sub(self.failures.len())
    }
}

/// Slices clips and renders GIFs for every segment of a source video.
#[derive(Clone)]
pub struct ClipRenderer {
    storage: Arc<dyn ObjectStore>,
    records: Arc<dyn RecordStore>,
    transcoder: Arc<dyn ClipTranscoder>,
    config: RenderConfig,
}

impl ClipRenderer {
    pub fn new(
        storage: Arc<dyn ObjectStore>,
        records: Arc<dyn RecordStore>,
        transcoder: Arc<dyn ClipTranscoder>,
        config: RenderConfig,
    ) -> Self {
        Self {
            storage,
            records,
            transcoder,
            config,
        }
    }

    /// Render both artifacts of every segment, then update the record of the
    /// original upload.
    ///
    /// A failed artifact is logged and skipped; the remaining artifacts and
    /// segments are still processed. Only scratch-directory setup aborts the
    /// whole run.
    pub async fn render(&self, source_object: &str, source_container: &str, segments: &[Segment]) -> WorkerResult<RenderReport> {
        let logger = JobLogger::new(source_object, "render_clips");
        logger.log_start(&format!("{} segments from s3://{}", segments.len(), source_container));

        tokio::fs::create_dir_all(&self.config.work_dir).await?;
        let scratch = tempfile::Builder::new()
            .prefix("render-")
            .tempdir_in(&self.config.work_dir)?;

        let artifacts: Vec<ClipArtifact> = segments
            .iter()
            .map(|segment| ClipArtifact::for_segment(source_object, segment))
            .collect();

        let mut failures = Vec::new();
        for (segment, artifact) in segments.iter().zip(&artifacts) {
            failures.extend(
                self.render_segment(&logger, &scratch, source_object, source_container, segment, artifact)
                    .await,
            );
        }

        let record_key = self.config.identity.original_key(source_object);
        let record = SlicedMediaRecord::from_artifacts(&artifacts, source_container);
        let record_update = self.records.update_sliced_media(&record_key, &record).await;
        if let Err(e) = &record_update {
            logger.log_warning(&format!("record update for {} failed: {}", record_key, e));
        }

        let report = RenderReport {
            video_paths: record.sliced_videos,
            gif_paths: record.sliced_gifs,
            failures,
            record_key,
            record_update,
        };

        logger.log_completion(&format!(
            "{} artifacts uploaded, {} skipped",
            report.uploaded(),
            report.failures.len()
        ));
        Ok(report)
    }

    async fn render_segment(
        &self,
        logger: &JobLogger,
        scratch: &TempDir,
        source_object: &str,
        source_container: &str,
        segment: &Segment,
        artifact: &ClipArtifact,
    ) -> Vec<ArtifactFailure> {
        let failure = |kind: ArtifactKind, error: String| ArtifactFailure {
            segment_key: artifact.segment_key.clone(),
            kind,
            error,
        };

        let source_url = match self
            .storage
            .presign_get(source_container, source_object, self.config.signed_url_ttl)
            .await
        {
            Ok(url) => url,
            Err(e) => {
                logger.log_warning(&format!("{}: cannot sign source: {}", artifact.segment_key, e));
                record_artifact(ArtifactKind::Clip.as_str(), false);
                record_artifact(ArtifactKind::Gif.as_str(), false);
                return vec![
                    failure(ArtifactKind::Clip, e.to_string()),
                    failure(ArtifactKind::Gif, e.to_string()),
                ];
            }
        };

        let mut failures = Vec::new();
        for kind in [ArtifactKind::Clip, ArtifactKind::Gif] {
            let (file_name, key) = match kind {
                ArtifactKind::Clip => (artifact.video_file_name(), &artifact.video_key),
                ArtifactKind::Gif => (artifact.gif_file_name(), &artifact.gif_key),
            };
            let local = scratch.path().join(file_name);

            let result = self
                .produce(kind, &source_url, segment, &local, source_container, key)
                .await;
            record_artifact(kind.as_str(), result.is_ok());

            match result {
                Ok(()) => debug!("Stored {} s3://{}/{}", kind, source_container, key),
                Err(e) => {
                    logger.log_warning(&format!("{} {}: {}", artifact.segment_key, kind, e));
                    failures.push(failure(kind, e));
                }
            }
        }
        failures
    }

    async fn produce(
        &self,
        kind: ArtifactKind,
        source_url: &str,
        segment: &Segment,
        local: &Path,
        bucket: &str,
        key: &str,
    ) -> Result<(), String> {
        let (start, duration) = (&segment.start_timecode, &segment.duration_timecode);

        let transcoded = match kind {
            ArtifactKind::Clip => self.transcoder.slice_clip(source_url, start, duration, local).await,
            ArtifactKind::Gif => self.transcoder.render_gif(source_url, start, duration, local).await,
        };
        transcoded.map_err(|e| e.to_string())?;

        self.storage
            .upload_file(local, bucket, key)
            .await
            .map_err(|e| e.to_string())?;

        if let Err(e) = tokio::fs::remove_file(local).await {
            warn!("Failed to remove {}: {}", local.display(), e);
        }
        info!("Uploaded {} to s3://{}/{}", kind, bucket, key);
        Ok(())
    }
}
