//! Shared data models for the Kada pipeline.
//!
//! This crate provides Serde-serializable types for:
//! - Segmentation job notifications and segment pages
//! - Normalized shot segments and segment batches
//! - Event-bus envelopes between the resolver and the renderer
//! - Clip artifacts, record payloads and source identity mapping
//! - Subtitle cues and the aligned audio timeline

pub mod artifact;
pub mod error;
pub mod event;
pub mod notification;
pub mod segment;
pub mod subtitle;
pub mod timecode;
pub mod timeline;

// Re-export common types
pub use artifact::{ClipArtifact, SlicedMediaRecord, SourceIdentity, DEFAULT_SOURCE_SUFFIXES};
pub use error::{ModelError, ModelResult};
pub use event::{EventEnvelope, PublishEntry, DETAIL_TYPE_SHOTS_AND_GIF, EVENT_SOURCE_CUSTOM};
pub use notification::{QueueBatch, QueueRecord, SegmentationNotification, VideoLocation};
pub use segment::{
    AudioMetadata, JobStatus, RawSegment, Segment, SegmentBatch, SegmentPage, SegmentType,
    VideoMetadata,
};
pub use subtitle::SubtitleCue;
pub use timeline::{AudioTimeline, TimelinePiece};
