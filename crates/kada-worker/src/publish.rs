//! Publishing of segment batches onto the event bus.

use std::time::Duration;

use tracing::{info, warn};

use kada_models::{PublishEntry, SegmentBatch};
use kada_queue::EventPublisher;

use crate::config::WorkerConfig;
use crate::error::{WorkerError, WorkerResult};
use crate::metrics::record_publish_attempt;
use crate::retry::{retry_async, RetryConfig, RetryResult};

/// Attempt budget and pause for publishing one event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PublishPolicy {
    pub max_attempts: u32,
    pub backoff: Duration,
}

impl Default for PublishPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            backoff: Duration::from_secs(5),
        }
    }
}

impl PublishPolicy {
    pub fn from_config(config: &WorkerConfig) -> Self {
        Self {
            max_attempts: config.publish_max_attempts,
            backoff: config.publish_backoff,
        }
    }

    fn retry_config(&self) -> RetryConfig {
        RetryConfig::new("put_events")
            .with_max_attempts(self.max_attempts)
            .with_backoff(self.backoff)
    }
}

/// What happened while publishing one event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishReport {
    pub attempts: u32,
    pub backoffs: u32,
    pub delivered: bool,
    /// Reason the last attempt failed, if it did
    pub last_error: Option<String>,
}

impl PublishReport {
    /// Turn an undelivered report into [`WorkerError::PublishExhausted`].
    pub fn into_result(self) -> WorkerResult<PublishReport> {
        if self.delivered {
            Ok(self)
        } else {
            Err(WorkerError::PublishExhausted {
                attempts: self.attempts,
                last_error: self.last_error.unwrap_or_default(),
            })
        }
    }
}

/// Publish one entry, retrying until the bus reports zero failed entries or
/// the budget is spent.
///
/// A transport error, a missing failure count and a non-zero failure count
/// all count as a failed attempt.
pub async fn publish_entry(
    publisher: &dyn EventPublisher,
    entry: &PublishEntry,
    policy: &PublishPolicy,
) -> PublishReport {
    let result = retry_async(&policy.retry_config(), || async move {
        let outcome = match publisher.put_event(entry).await {
            Ok(ack) if ack.is_delivered() => Ok(()),
            Ok(ack) => Err(match ack.failed_entry_count {
                Some(n) => format!("{} entries failed", n),
                None => "no failure count in acknowledgement".to_string(),
            }),
            Err(e) => Err(e.to_string()),
        };
        record_publish_attempt(outcome.is_ok());
        outcome
    })
    .await;

    let (attempts, backoffs) = (result.attempts(), result.backoffs());
    match result {
        RetryResult::Success { .. } => PublishReport {
            attempts,
            backoffs,
            delivered: true,
            last_error: None,
        },
        RetryResult::Failed { error, .. } => PublishReport {
            attempts,
            backoffs,
            delivered: false,
            last_error: Some(error),
        },
    }
}

/// Package `batch` as a shots-and-GIF event and publish it.
pub async fn publish_batch(
    publisher: &dyn EventPublisher,
    batch: &SegmentBatch,
    event_bus_name: &str,
    policy: &PublishPolicy,
) -> WorkerResult<PublishReport> {
    let entry = PublishEntry::shots_and_gif(batch, event_bus_name)?;
    let report = publish_entry(publisher, &entry, policy).await;

    if report.delivered {
        info!(
            job_id = %batch.job_id(),
            attempts = report.attempts,
            "Published {} segments to {}",
            batch.len(),
            event_bus_name
        );
    } else {
        warn!(
            job_id = %batch.job_id(),
            attempts = report.attempts,
            "Giving up publishing to {}",
            event_bus_name
        );
    }

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fakes::{sample_batch, FakePublisher};
    use kada_queue::PublishAck;

    #[tokio::test(start_paused = true)]
    async fn test_third_attempt_succeeds() {
        let publisher = FakePublisher::new(vec![
            Ok(PublishAck {
                failed_entry_count: Some(1),
            }),
            Ok(PublishAck {
                failed_entry_count: Some(1),
            }),
            Ok(PublishAck::accepted()),
        ]);
        let started = tokio::time::Instant::now();

        let report = publish_batch(&publisher, &sample_batch(), "kada-bus", &PublishPolicy::default())
            .await
            .unwrap();

        assert_eq!(report.attempts, 3);
        assert_eq!(report.backoffs, 2);
        assert!(report.delivered);
        assert_eq!(publisher.calls(), 3);
        assert_eq!(started.elapsed(), Duration::from_secs(10));
    }

    #[tokio::test(start_paused = true)]
    async fn test_missing_count_and_errors_are_retried() {
        let publisher = FakePublisher::new(vec![
            Ok(PublishAck::default()),
            Err("throttled".to_string()),
            Ok(PublishAck::accepted()),
        ]);

        let report = publish_batch(&publisher, &sample_batch(), "kada-bus", &PublishPolicy::default())
            .await
            .unwrap();

        assert_eq!(report.attempts, 3);
        assert!(report.delivered);
    }

    #[tokio::test(start_paused = true)]
    async fn test_exhausted_budget_is_reported() {
        let publisher = FakePublisher::new(vec![
            Ok(PublishAck {
                failed_entry_count: Some(1),
            });
            4
        ]);

        let report = publish_batch(&publisher, &sample_batch(), "kada-bus", &PublishPolicy::default())
            .await
            .unwrap();

        assert_eq!(report.attempts, 3);
        assert_eq!(report.backoffs, 2);
        assert!(!report.delivered);
        assert_eq!(publisher.calls(), 3);

        let err = report.into_result().unwrap_err();
        assert!(matches!(err, WorkerError::PublishExhausted { attempts: 3, .. }));
    }

    #[tokio::test]
    async fn test_published_entry_shape() {
        let publisher = FakePublisher::new(vec![Ok(PublishAck::accepted())]);
        publish_batch(&publisher, &sample_batch(), "kada-bus", &PublishPolicy::default())
            .await
            .unwrap();

        let entry = publisher.entries().remove(0);
        assert_eq!(entry.source, "custom");
        assert_eq!(entry.detail_type, "videoShotsAndGif");
        assert_eq!(entry.event_bus_name, "kada-bus");
        assert_eq!(entry.batch().unwrap(), sample_batch());
    }
}
