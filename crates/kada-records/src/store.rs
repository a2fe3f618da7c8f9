//! DynamoDB-backed media records.

use std::collections::HashMap;
use std::time::Instant;

use async_trait::async_trait;
use aws_sdk_dynamodb::types::AttributeValue;
use aws_sdk_dynamodb::Client;
use aws_types::SdkConfig;
use tracing::{debug, info, warn};

use kada_models::SlicedMediaRecord;

use crate::error::{RecordError, RecordResult};
use crate::metrics::record_request;

/// Partition key attribute of the media table.
const KEY_ATTRIBUTE: &str = "id";

const UPDATE_EXPRESSION: &str =
    "SET #slicedVideos = :slicedVideos, #slicedGifs = :slicedGifs, #s3Bucket = :s3Bucket";

/// Updates media records once derived artifacts exist.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Set the sliced-media attributes of the record keyed by `key`.
    ///
    /// Only the three sliced-media attributes are written; other attributes
    /// of the record are left untouched.
    async fn update_sliced_media(&self, key: &str, record: &SlicedMediaRecord) -> RecordResult<()>;
}

/// Record store configuration.
#[derive(Debug, Clone)]
pub struct RecordStoreConfig {
    /// Table holding one record per original upload
    pub table_name: String,
}

/// [`RecordStore`] backed by a DynamoDB table.
#[derive(Clone)]
pub struct DynamoRecordStore {
    client: Client,
    table_name: String,
}

impl DynamoRecordStore {
    pub fn new(sdk_config: &SdkConfig, config: RecordStoreConfig) -> Self {
        Self {
            client: Client::new(sdk_config),
            table_name: config.table_name,
        }
    }

    pub fn table_name(&self) -> &str {
        &self.table_name
    }
}

#[async_trait]
impl RecordStore for DynamoRecordStore {
    async fn update_sliced_media(&self, key: &str, record: &SlicedMediaRecord) -> RecordResult<()> {
        debug!(
            "Updating record {} in {} ({} videos, {} gifs)",
            key,
            self.table_name,
            record.sliced_videos.len(),
            record.sliced_gifs.len()
        );

        let started = Instant::now();
        let result = self
            .client
            .update_item()
            .table_name(&self.table_name)
            .key(KEY_ATTRIBUTE, AttributeValue::S(key.to_string()))
            .update_expression(UPDATE_EXPRESSION)
            .set_expression_attribute_names(Some(attribute_names()))
            .set_expression_attribute_values(Some(attribute_values(record)))
            .send()
            .await;

        let latency_ms = started.elapsed().as_secs_f64() * 1000.0;
        record_request("update_sliced_media", result.is_ok(), latency_ms);

        match result {
            Ok(_) => {
                info!("Updated sliced media of record {}", key);
                Ok(())
            }
            Err(e) => {
                warn!("Record update failed for {}: {}", key, e);
                Err(RecordError::update_failed(key, e.to_string()))
            }
        }
    }
}

fn attribute_names() -> HashMap<String, String> {
    ["slicedVideos", "slicedGifs", "s3Bucket"]
        .into_iter()
        .map(|name| (format!("#{}", name), name.to_string()))
        .collect()
}

fn attribute_values(record: &SlicedMediaRecord) -> HashMap<String, AttributeValue> {
    let list = |keys: &[String]| {
        AttributeValue::L(keys.iter().cloned().map(AttributeValue::S).collect())
    };

    HashMap::from([
        (":slicedVideos".to_string(), list(&record.sliced_videos)),
        (":slicedGifs".to_string(), list(&record.sliced_gifs)),
        (":s3Bucket".to_string(), AttributeValue::S(record.s3_bucket.clone())),
    ])
}
