//! Segment resolver and clip renderer worker.
//!
//! This crate provides:
//! - Paginated segment resolution of finished segmentation jobs
//! - Publishing of segment batches with a bounded retry budget
//! - Clip and GIF rendering with upload and record update
//! - Handlers for the two inbound triggers

pub mod config;
pub mod error;
pub mod handlers;
pub mod logging;
pub mod metrics;
pub mod publish;
pub mod renderer;
pub mod resolver;
pub mod retry;

#[cfg(test)]
pub(crate) mod fakes;

pub use config::WorkerConfig;
pub use error::{WorkerError, WorkerResult};
pub use handlers::{RecordOutcome, RenderHandler, ResolveHandler};
pub use logging::JobLogger;
pub use publish::{publish_batch, PublishPolicy, PublishReport};
pub use renderer::{ArtifactFailure, ArtifactKind, ClipRenderer, RenderConfig, RenderReport};
pub use resolver::{next_page, PaginationState, RekognitionSegmentQuery, SegmentQuery, SegmentResolver};
