//! Inbound message queue backed by SQS.

use async_trait::async_trait;
use aws_sdk_sqs::Client;
use aws_types::SdkConfig;
use tracing::{debug, warn};

use crate::error::{QueueError, QueueResult};

/// Acknowledgement side of the inbound queue.
#[async_trait]
pub trait MessageQueue: Send + Sync {
    /// Remove a consumed message so it is not redelivered.
    async fn delete_message(&self, receipt_handle: &str) -> QueueResult<()>;
}

/// Queue configuration.
#[derive(Debug, Clone)]
pub struct QueueConfig {
    /// URL of the queue receiving job notifications
    pub queue_url: String,
}

/// [`MessageQueue`] backed by SQS.
#[derive(Clone)]
pub struct SqsQueue {
    client: Client,
    config: QueueConfig,
}

impl SqsQueue {
    pub fn new(sdk_config: &SdkConfig, config: QueueConfig) -> Self {
        Self {
            client: Client::new(sdk_config),
            config,
        }
    }

    pub fn queue_url(&self) -> &str {
        &self.config.queue_url
    }
}

#[async_trait]
impl MessageQueue for SqsQueue {
    async fn delete_message(&self, receipt_handle: &str) -> QueueResult<()> {
        self.client
            .delete_message()
            .queue_url(&self.config.queue_url)
            .receipt_handle(receipt_handle)
            .send()
            .await
            .map_err(|e| {
                warn!("Failed to delete message from {}: {}", self.config.queue_url, e);
                QueueError::delete_failed(e.to_string())
            })?;

        debug!("Deleted message from {}", self.config.queue_url);
        Ok(())
    }
}
