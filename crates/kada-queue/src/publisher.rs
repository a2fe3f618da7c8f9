//! Event publishing onto EventBridge.

use async_trait::async_trait;
use aws_sdk_eventbridge::primitives::DateTime;
use aws_sdk_eventbridge::operation::put_events::PutEventsOutput;
use aws_sdk_eventbridge::types::PutEventsRequestEntry;
use aws_sdk_eventbridge::Client;
use aws_types::SdkConfig;
use tracing::{debug, warn};

use kada_models::PublishEntry;

use crate::error::{QueueError, QueueResult};

/// Outcome of one put call as reported by the bus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PublishAck {
    /// Number of rejected entries; `None` when the bus returned no result.
    pub failed_entry_count: Option<i32>,
}

impl PublishAck {
    pub fn accepted() -> Self {
        Self {
            failed_entry_count: Some(0),
        }
    }

    /// The entry was accepted: a result came back and nothing failed.
    pub fn is_delivered(&self) -> bool {
        self.failed_entry_count == Some(0)
    }
}

/// Sends pipeline events to the event bus.
#[async_trait]
pub trait EventPublisher: Send + Sync {
    /// Submit a single entry. Transport errors are returned as `Err`;
    /// per-entry rejections are reported through the ack.
    async fn put_event(&self, entry: &PublishEntry) -> QueueResult<PublishAck>;
}

/// [`EventPublisher`] backed by EventBridge.
#[derive(Clone)]
pub struct EventBridgePublisher {
    client: Client,
}

impl EventBridgePublisher {
    pub fn new(sdk_config: &SdkConfig) -> Self {
        Self {
            client: Client::new(sdk_config),
        }
    }
}

#[async_trait]
impl EventPublisher for EventBridgePublisher {
    async fn put_event(&self, entry: &PublishEntry) -> QueueResult<PublishAck> {
        let request_entry = PutEventsRequestEntry::builder()
            .time(DateTime::from_millis(entry.time.timestamp_millis()))
            .source(&entry.source)
            .event_bus_name(&entry.event_bus_name)
            .detail_type(&entry.detail_type)
            .detail(&entry.detail)
            .build();

        let output = self
            .client
            .put_events()
            .entries(request_entry)
            .send()
            .await
            .map_err(|e| QueueError::publish_failed(e.to_string()))?;

        let ack = ack_from_output(&output);
        if let Some(failed) = ack.failed_entry_count.filter(|n| *n > 0) {
            for result in output.entries() {
                if let Some(code) = result.error_code() {
                    warn!(
                        "Event rejected by {}: {} {}",
                        entry.event_bus_name,
                        code,
                        result.error_message().unwrap_or_default()
                    );
                }
            }
            debug!("{} entries failed", failed);
        }

        Ok(ack)
    }
}

/// Read the bus's `FailedEntryCount`. An empty result list means the bus
/// gave no answer, whatever the count says.
fn ack_from_output(output: &PutEventsOutput) -> PublishAck {
    if output.entries().is_empty() {
        return PublishAck::default();
    }

    PublishAck {
        failed_entry_count: failed_count(output.failed_entry_count()),
    }
}

// Plain or optional depending on the SDK shape.
fn failed_count(value: impl Into<Option<i32>>) -> Option<i32> {
    value.into()
}
