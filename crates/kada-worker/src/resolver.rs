//! Segment resolution for finished segmentation jobs.
//!
//! Pages are fetched one at a time and folded into a [`SegmentBatch`] by the
//! pure [`next_page`] step. The loop ends when a page carries no
//! continuation cursor.

use std::sync::Arc;

use async_trait::async_trait;
use aws_sdk_rekognition::Client;
use aws_types::SdkConfig;
use tracing::{debug, info};

use kada_models::{
    AudioMetadata, JobStatus, RawSegment, Segment, SegmentBatch, SegmentPage, SegmentType,
    VideoMetadata,
};

use crate::config::WorkerConfig;
use crate::error::{WorkerError, WorkerResult};
use crate::logging::JobLogger;
use crate::metrics::record_segment_page;

/// One page of a segmentation job's results.
#[async_trait]
pub trait SegmentQuery: Send + Sync {
    /// Fetch the page at `cursor` (`None` for the first page). Each call is a
    /// single attempt; errors map to [`WorkerError::JobQuery`].
    async fn get_page(&self, job_id: &str, cursor: Option<&str>, max_results: i32) -> WorkerResult<SegmentPage>;
}

/// Progress of a paginated query.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PaginationState {
    cursor: Option<String>,
    done: bool,
    pages: u32,
}

impl PaginationState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cursor for the next query; `None` before the first page.
    pub fn cursor(&self) -> Option<&str> {
        self.cursor.as_deref()
    }

    pub fn is_done(&self) -> bool {
        self.done
    }

    /// Pages consumed so far.
    pub fn pages(&self) -> u32 {
        self.pages
    }
}

/// Fold one page into the pagination state.
///
/// Returns the page's SHOT segments (normalized) and the next state. The
/// state is done once a page arrives without a continuation cursor.
pub fn next_page(state: PaginationState, page: &SegmentPage) -> (Vec<Segment>, PaginationState) {
    let segments = page.segments.iter().filter_map(Segment::from_raw).collect();
    let cursor = page.next_token.clone().filter(|t| !t.is_empty());

    let next = PaginationState {
        done: cursor.is_none(),
        cursor,
        pages: state.pages + 1,
    };
    (segments, next)
}

/// Resolves a finished segmentation job into one [`SegmentBatch`].
#[derive(Clone)]
pub struct SegmentResolver {
    query: Arc<dyn SegmentQuery>,
    page_size: i32,
    fail_on_job_failure: bool,
}

impl SegmentResolver {
    pub fn new(query: Arc<dyn SegmentQuery>, config: &WorkerConfig) -> Self {
        Self {
            query,
            page_size: config.segment_page_size,
            fail_on_job_failure: config.fail_on_job_failure,
        }
    }

    /// Query every page of `job_id` and collect its SHOT segments in order.
    pub async fn resolve(&self, job_id: &str, source_object: &str, source_container: &str) -> WorkerResult<SegmentBatch> {
        let logger = JobLogger::new(job_id, "resolve_segments");
        logger.log_start(&format!("s3://{}/{}", source_container, source_object));

        let mut state = PaginationState::new();
        let mut segments = Vec::new();

        while !state.is_done() {
            let page = self.query.get_page(job_id, state.cursor(), self.page_size).await?;
            record_segment_page();

            if state.pages() == 0 {
                log_job_diagnostics(&logger, &page);
                if self.fail_on_job_failure && page.job_status.is_failed() {
                    logger.log_error("segmentation job failed");
                    return Err(WorkerError::job_failed(job_id, page.job_status.as_str()));
                }
            }

            let (found, next) = next_page(state, &page);
            debug!(
                job_id = %job_id,
                page = next.pages(),
                "Page with {} segments, {} shots",
                page.segments.len(),
                found.len()
            );
            segments.extend(found);
            state = next;
        }

        let batch = SegmentBatch::new(job_id, source_object, source_container, segments);
        logger.log_completion(&format!("{} shots over {} pages", batch.len(), state.pages()));
        Ok(batch)
    }
}

fn log_job_diagnostics(logger: &JobLogger, page: &SegmentPage) {
    info!(job_id = %logger.job_id(), status = %page.job_status, "Segmentation job status");

    for video in &page.video_metadata {
        debug!(
            job_id = %logger.job_id(),
            codec = video.codec.as_deref().unwrap_or("-"),
            duration_ms = video.duration_millis.unwrap_or_default(),
            frame_rate = video.frame_rate.unwrap_or_default(),
            width = video.frame_width.unwrap_or_default(),
            height = video.frame_height.unwrap_or_default(),
            "Video metadata"
        );
    }
    for audio in &page.audio_metadata {
        debug!(
            job_id = %logger.job_id(),
            codec = audio.codec.as_deref().unwrap_or("-"),
            duration_ms = audio.duration_millis.unwrap_or_default(),
            sample_rate = audio.sample_rate.unwrap_or_default(),
            channels = audio.number_of_channels.unwrap_or_default(),
            "Audio metadata"
        );
    }
}

/// [`SegmentQuery`] backed by Rekognition segment detection.
#[derive(Clone)]
pub struct RekognitionSegmentQuery {
    client: Client,
}

impl RekognitionSegmentQuery {
    pub fn new(sdk_config: &SdkConfig) -> Self {
        Self {
            client: Client::new(sdk_config),
        }
    }
}

#[async_trait]
impl SegmentQuery for RekognitionSegmentQuery {
    async fn get_page(&self, job_id: &str, cursor: Option<&str>, max_results: i32) -> WorkerResult<SegmentPage> {
        let output = self
            .client
            .get_segment_detection()
            .job_id(job_id)
            .max_results(max_results)
            .set_next_token(cursor.map(str::to_string))
            .send()
            .await
            .map_err(|e| WorkerError::job_query(format!("{}: {}", job_id, e)))?;

        let segments = output
            .segments()
            .iter()
            .map(|s| RawSegment {
                segment_type: segment_type(s.r#type().map(|t| t.as_str())),
                start_timecode: s.start_timecode_smpte().unwrap_or_default().to_string(),
                duration_timecode: s.duration_smpte().unwrap_or_default().to_string(),
                start_millis: millis(s.start_timestamp_millis()),
                end_millis: millis(s.end_timestamp_millis()),
                duration_millis: millis(s.duration_millis()),
            })
            .collect();

        let video_metadata = output
            .video_metadata()
            .iter()
            .map(|v| VideoMetadata {
                codec: v.codec().map(str::to_string),
                duration_millis: opt_millis(v.duration_millis()),
                format: v.format().map(str::to_string),
                frame_rate: v.frame_rate().into(),
                frame_height: opt_u32(v.frame_height()),
                frame_width: opt_u32(v.frame_width()),
            })
            .collect();

        let audio_metadata = output
            .audio_metadata()
            .iter()
            .map(|a| AudioMetadata {
                codec: a.codec().map(str::to_string),
                duration_millis: opt_millis(a.duration_millis()),
                sample_rate: opt_u32(a.sample_rate()),
                number_of_channels: opt_u32(a.number_of_channels()),
            })
            .collect();

        Ok(SegmentPage {
            job_status: output
                .job_status()
                .map(|s| JobStatus::parse(s.as_str()))
                .unwrap_or(JobStatus::Unknown),
            segments,
            video_metadata,
            audio_metadata,
            next_token: output.next_token().map(str::to_string),
        })
    }
}

fn segment_type(value: Option<&str>) -> SegmentType {
    match value {
        Some("SHOT") => SegmentType::Shot,
        Some("TECHNICAL_CUE") => SegmentType::TechnicalCue,
        _ => SegmentType::Other,
    }
}

// SDK numeric fields are plain or optional depending on the shape.
fn millis(value: impl Into<Option<i64>>) -> u64 {
    opt_millis(value).unwrap_or_default()
}

fn opt_millis(value: impl Into<Option<i64>>) -> Option<u64> {
    value.into().map(|v| v.max(0) as u64)
}

fn opt_u32(value: impl Into<Option<i64>>) -> Option<u32> {
    value.into().and_then(|v| u32::try_from(v).ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fakes::{raw_segment, FakeSegmentQuery};

    fn page(segments: Vec<RawSegment>, next_token: Option<&str>) -> SegmentPage {
        SegmentPage {
            job_status: JobStatus::Succeeded,
            segments,
            next_token: next_token.map(str::to_string),
            ..Default::default()
        }
    }

    fn resolver(query: Arc<FakeSegmentQuery>) -> SegmentResolver {
        SegmentResolver::new(query, &WorkerConfig::default())
    }

    #[test]
    fn test_next_page_filters_and_advances() {
        let page = page(
            vec![
                raw_segment(SegmentType::TechnicalCue, "00:00:00:00", "00:00:53:08"),
                raw_segment(SegmentType::Shot, "00:00:00:00", "00:00:53:08"),
            ],
            Some("token-1"),
        );

        let (segments, state) = next_page(PaginationState::new(), &page);
        assert_eq!(segments.len(), 1);
        assert_eq!(segments[0].start_timecode, "00:00:00");
        assert_eq!(segments[0].duration_timecode, "00:00:53");
        assert_eq!(state.cursor(), Some("token-1"));
        assert!(!state.is_done());
        assert_eq!(state.pages(), 1);
    }

    #[test]
    fn test_next_page_without_cursor_is_done() {
        let (_, state) = next_page(PaginationState::new(), &page(Vec::new(), None));
        assert!(state.is_done());

        // An empty token ends pagination as well.
        let (_, state) = next_page(PaginationState::new(), &page(Vec::new(), Some("")));
        assert!(state.is_done());
    }

    #[tokio::test]
    async fn test_two_pages_two_queries() {
        let query = Arc::new(FakeSegmentQuery::new(vec![
            page(
                vec![
                    raw_segment(SegmentType::Shot, "00:00:00:00", "00:00:04:10"),
                    raw_segment(SegmentType::TechnicalCue, "00:00:00:00", "00:00:53:08"),
                ],
                Some("next"),
            ),
            page(vec![raw_segment(SegmentType::Shot, "00:00:04:10", "00:00:06:02")], None),
        ]));

        let batch = resolver(query.clone())
            .resolve("job-1", "clip-iframe-output.mp4", "processed")
            .await
            .unwrap();

        assert_eq!(query.cursors(), vec![None, Some("next".to_string())]);
        assert_eq!(batch.len(), 2);
        assert_eq!(batch.segments()[0].start_timecode, "00:00:00");
        assert_eq!(batch.segments()[1].start_timecode, "00:00:04");
        assert!(batch.segments().iter().all(|s| s.segment_type == SegmentType::Shot));
        assert_eq!(batch.source_object(), "clip-iframe-output.mp4");
        assert_eq!(batch.source_container(), "processed");
    }

    #[tokio::test]
    async fn test_pages_equal_cursors_plus_one() {
        let query = Arc::new(FakeSegmentQuery::new(vec![
            page(Vec::new(), Some("a")),
            page(Vec::new(), Some("b")),
            page(Vec::new(), Some("c")),
            page(Vec::new(), None),
        ]));

        resolver(query.clone()).resolve("job-1", "v.mp4", "b").await.unwrap();
        assert_eq!(query.cursors().len(), 4);
    }

    #[tokio::test]
    async fn test_failed_status_short_circuits() {
        let mut first = page(vec![raw_segment(SegmentType::Shot, "00:00:00:00", "00:00:01:00")], Some("next"));
        first.job_status = JobStatus::Failed;
        let query = Arc::new(FakeSegmentQuery::new(vec![first.clone(), page(Vec::new(), None)]));

        let err = resolver(query.clone()).resolve("job-1", "v.mp4", "b").await.unwrap_err();
        assert!(matches!(err, WorkerError::JobFailed { .. }));
        assert_eq!(query.cursors().len(), 1);

        // With the short-circuit disabled only the cursor ends the loop.
        let query = Arc::new(FakeSegmentQuery::new(vec![first, page(Vec::new(), None)]));
        let config = WorkerConfig {
            fail_on_job_failure: false,
            ..Default::default()
        };
        let batch = SegmentResolver::new(query.clone(), &config)
            .resolve("job-1", "v.mp4", "b")
            .await
            .unwrap();
        assert_eq!(batch.len(), 1);
        assert_eq!(query.cursors().len(), 2);
    }

    #[tokio::test]
    async fn test_in_progress_status_does_not_change_flow() {
        let mut first = page(Vec::new(), None);
        first.job_status = JobStatus::InProgress;
        let query = Arc::new(FakeSegmentQuery::new(vec![first]));

        let batch = resolver(query).resolve("job-1", "v.mp4", "b").await.unwrap();
        assert!(batch.is_empty());
    }

    #[tokio::test]
    async fn test_query_error_is_not_retried() {
        let query = Arc::new(FakeSegmentQuery::failing());

        let err = resolver(query.clone()).resolve("job-1", "v.mp4", "b").await.unwrap_err();
        assert!(matches!(err, WorkerError::JobQuery(_)));
        assert_eq!(query.cursors().len(), 1);
    }

    #[test]
    fn test_numeric_conversions() {
        assert_eq!(millis(5_i64), 5);
        assert_eq!(millis(None::<i64>), 0);
        assert_eq!(opt_millis(Some(-3_i64)), Some(0));
        assert_eq!(opt_u32(Some(1280_i64)), Some(1280));
        assert_eq!(opt_u32(Some(-1_i64)), None);
        assert_eq!(segment_type(Some("SHOT")), SegmentType::Shot);
        assert_eq!(segment_type(Some("FUTURE")), SegmentType::Other);
    }
}
