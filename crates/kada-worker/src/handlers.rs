//! Handlers for the two inbound triggers.
//!
//! - [`ResolveHandler`]: queue records announcing finished segmentation jobs
//! - [`RenderHandler`]: shots-and-GIF events carrying a segment batch

use std::sync::Arc;

use tracing::{error, info, warn, Instrument};

use kada_models::{EventEnvelope, QueueRecord, SegmentationNotification};
use kada_queue::{EventPublisher, MessageQueue};

use crate::error::{WorkerError, WorkerResult};
use crate::logging::JobLogger;
use crate::metrics::record_queue_record;
use crate::publish::{publish_batch, PublishPolicy, PublishReport};
use crate::renderer::{ClipRenderer, RenderReport};
use crate::resolver::SegmentResolver;

/// What happened to one queue record.
#[derive(Debug)]
pub enum RecordOutcome {
    /// Malformed record; nothing was processed and the message was kept.
    Skipped { reason: String },
    /// Segments resolved and a publish attempted; see the report for delivery.
    Published {
        job_id: String,
        segments: usize,
        report: PublishReport,
    },
    /// Deleting, resolving or packaging failed.
    Failed { job_id: String, error: WorkerError },
}

/// Consumes segmentation notifications: acknowledge, resolve, publish.
#[derive(Clone)]
pub struct ResolveHandler {
    queue: Arc<dyn MessageQueue>,
    resolver: SegmentResolver,
    publisher: Arc<dyn EventPublisher>,
    policy: PublishPolicy,
    event_bus_name: String,
}

impl ResolveHandler {
    pub fn new(
        queue: Arc<dyn MessageQueue>,
        resolver: SegmentResolver,
        publisher: Arc<dyn EventPublisher>,
        policy: PublishPolicy,
        event_bus_name: impl Into<String>,
    ) -> Self {
        Self {
            queue,
            resolver,
            publisher,
            policy,
            event_bus_name: event_bus_name.into(),
        }
    }

    /// Handle every record of a delivery independently, in order.
    pub async fn handle_records(&self, records: &[QueueRecord]) -> Vec<RecordOutcome> {
        let mut outcomes = Vec::with_capacity(records.len());
        for record in records {
            let outcome = self.handle_record(record).await;
            record_queue_record(match &outcome {
                RecordOutcome::Skipped { .. } => "skipped",
                RecordOutcome::Published { report, .. } if report.delivered => "published",
                RecordOutcome::Published { .. } => "undelivered",
                RecordOutcome::Failed { .. } => "failed",
            });
            outcomes.push(outcome);
        }
        outcomes
    }

    /// Handle one record.
    ///
    /// The message is deleted before the job is queried, so a crash while
    /// resolving loses the message instead of reprocessing it.
    pub async fn handle_record(&self, record: &QueueRecord) -> RecordOutcome {
        let notification = match SegmentationNotification::from_record_body(&record.body) {
            Ok(n) => n,
            Err(e) => {
                warn!(
                    message_id = record.message_id.as_deref().unwrap_or("-"),
                    "Skipping malformed queue record: {}", e
                );
                return RecordOutcome::Skipped {
                    reason: e.to_string(),
                };
            }
        };

        let job_id = notification.job_id.clone();
        let logger = JobLogger::new(&job_id, "handle_notification");
        logger.log_start(&format!(
            "status {} for s3://{}/{}",
            notification.status, notification.video.bucket, notification.video.object_name
        ));

        match self
            .process(&notification, &record.receipt_handle)
            .instrument(logger.create_span())
            .await
        {
            Ok((segments, report)) => {
                if let Err(e) = report.clone().into_result() {
                    logger.log_error(&e.to_string());
                }
                RecordOutcome::Published {
                    job_id,
                    segments,
                    report,
                }
            }
            Err(e) => {
                logger.log_error(&e.to_string());
                RecordOutcome::Failed { job_id, error: e }
            }
        }
    }

    async fn process(
        &self,
        notification: &SegmentationNotification,
        receipt_handle: &str,
    ) -> WorkerResult<(usize, PublishReport)> {
        self.queue.delete_message(receipt_handle).await?;

        let batch = self
            .resolver
            .resolve(
                &notification.job_id,
                &notification.video.object_name,
                &notification.video.bucket,
            )
            .await?;

        let report = publish_batch(self.publisher.as_ref(), &batch, &self.event_bus_name, &self.policy).await?;
        Ok((batch.len(), report))
    }
}

/// Consumes shots-and-GIF events: render and record.
#[derive(Clone)]
pub struct RenderHandler {
    renderer: ClipRenderer,
}

impl RenderHandler {
    pub fn new(renderer: ClipRenderer) -> Self {
        Self { renderer }
    }

    /// Render the batch carried by `envelope`. Other events are ignored and
    /// yield `None`.
    pub async fn handle_event(&self, envelope: &EventEnvelope) -> WorkerResult<Option<RenderReport>> {
        if !envelope.is_shots_and_gif() {
            info!(
                "Ignoring event {} / {}",
                envelope.source, envelope.detail_type
            );
            return Ok(None);
        }

        let batch = &envelope.detail;
        let report = self
            .renderer
            .render(batch.source_object(), batch.source_container(), batch.segments())
            .await?;

        if let Err(e) = &report.record_update {
            error!(job_id = %batch.job_id(), "Record update failed: {}", e);
        }
        Ok(Some(report))
    }
}
