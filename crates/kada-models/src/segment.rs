//! Segmentation job results and normalized shot segments.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::timecode::strip_frames;

/// Segment type reported by the segmentation job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SegmentType {
    /// Continuous run of frames without a camera cut
    #[default]
    Shot,
    /// Structural element (black frames, credits, slate, ...)
    TechnicalCue,
    /// Any type this pipeline does not know about
    #[serde(other)]
    Other,
}

impl SegmentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SegmentType::Shot => "SHOT",
            SegmentType::TechnicalCue => "TECHNICAL_CUE",
            SegmentType::Other => "OTHER",
        }
    }
}

impl fmt::Display for SegmentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Job-level status of a segmentation job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum JobStatus {
    InProgress,
    #[default]
    Succeeded,
    Failed,
    #[serde(other)]
    Unknown,
}

impl JobStatus {
    /// Parse the wire representation, mapping anything unexpected to `Unknown`.
    pub fn parse(s: &str) -> Self {
        match s {
            "IN_PROGRESS" => JobStatus::InProgress,
            "SUCCEEDED" => JobStatus::Succeeded,
            "FAILED" => JobStatus::Failed,
            _ => JobStatus::Unknown,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::InProgress => "IN_PROGRESS",
            JobStatus::Succeeded => "SUCCEEDED",
            JobStatus::Failed => "FAILED",
            JobStatus::Unknown => "UNKNOWN",
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, JobStatus::Failed)
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A segment exactly as returned by the segmentation job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RawSegment {
    #[serde(rename = "Type")]
    pub segment_type: SegmentType,
    #[serde(rename = "StartTimecodeSMPTE")]
    pub start_timecode: String,
    #[serde(rename = "DurationSMPTE")]
    pub duration_timecode: String,
    #[serde(rename = "StartTimestampMillis")]
    pub start_millis: u64,
    #[serde(rename = "EndTimestampMillis")]
    pub end_millis: u64,
    pub duration_millis: u64,
}

/// Video stream metadata reported with the first page.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct VideoMetadata {
    pub codec: Option<String>,
    pub duration_millis: Option<u64>,
    pub format: Option<String>,
    pub frame_rate: Option<f32>,
    pub frame_height: Option<u32>,
    pub frame_width: Option<u32>,
}

/// Audio stream metadata reported with the first page.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct AudioMetadata {
    pub codec: Option<String>,
    pub duration_millis: Option<u64>,
    pub sample_rate: Option<u32>,
    pub number_of_channels: Option<u32>,
}

/// One page of a segmentation job query.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SegmentPage {
    pub job_status: JobStatus,
    #[serde(default)]
    pub segments: Vec<RawSegment>,
    #[serde(default)]
    pub video_metadata: Vec<VideoMetadata>,
    #[serde(default)]
    pub audio_metadata: Vec<AudioMetadata>,
    /// Continuation cursor; `None` on the last page
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_token: Option<String>,
}

/// A normalized segment: SHOT only, timecodes without frame fields.
///
/// Serializes as one entry of the `segmentsMeta` array of the shots event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Segment {
    #[serde(default, skip_serializing)]
    pub segment_type: SegmentType,
    #[serde(rename = "startTimecodeSMPTE")]
    pub start_timecode: String,
    #[serde(rename = "durationSMPTE")]
    pub duration_timecode: String,
    #[serde(rename = "startTimestampMillis")]
    pub start_millis: u64,
    #[serde(rename = "endTimestampMillis")]
    pub end_millis: u64,
    #[serde(rename = "durationMillis")]
    pub duration_millis: u64,
}

impl Segment {
    /// Normalize a raw segment, dropping anything that is not a SHOT.
    pub fn from_raw(raw: &RawSegment) -> Option<Self> {
        if raw.segment_type != SegmentType::Shot {
            return None;
        }

        Some(Self {
            segment_type: SegmentType::Shot,
            start_timecode: strip_frames(&raw.start_timecode),
            duration_timecode: strip_frames(&raw.duration_timecode),
            start_millis: raw.start_millis,
            end_millis: raw.end_millis,
            duration_millis: raw.duration_millis,
        })
    }

    /// Key identifying this segment within its source: `start-duration`.
    pub fn segment_key(&self) -> String {
        format!("{}-{}", self.start_timecode, self.duration_timecode)
    }
}

/// All SHOT segments of one completed segmentation job.
///
/// Immutable once built; serializes as the `detail` of the shots event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SegmentBatch {
    #[serde(rename = "jobId")]
    job_id: String,
    #[serde(rename = "s3Object")]
    source_object: String,
    #[serde(rename = "s3Bucket")]
    source_container: String,
    #[serde(rename = "segmentsMeta", default)]
    segments: Vec<Segment>,
}

impl SegmentBatch {
    /// Build a batch. Non-SHOT segments are rejected here as well so the
    /// invariant holds no matter how the batch was assembled.
    pub fn new(
        job_id: impl Into<String>,
        source_object: impl Into<String>,
        source_container: impl Into<String>,
        segments: Vec<Segment>,
    ) -> Self {
        Self {
            job_id: job_id.into(),
            source_object: source_object.into(),
            source_container: source_container.into(),
            segments: segments
                .into_iter()
                .filter(|s| s.segment_type == SegmentType::Shot)
                .collect(),
        }
    }

    pub fn job_id(&self) -> &str {
        &self.job_id
    }

    pub fn source_object(&self) -> &str {
        &self.source_object
    }

    pub fn source_container(&self) -> &str {
        &self.source_container
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }
}
