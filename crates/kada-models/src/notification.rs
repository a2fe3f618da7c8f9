//! Queue records announcing a finished segmentation job.
//!
//! The queue body is a notification envelope whose `Message` field holds the
//! job notification as a JSON string:
//!
//! ```json
//! {"Type": "Notification", "Message": "{\"JobId\":\"...\",\"Status\":\"SUCCEEDED\",\"Video\":{...}}"}
//! ```

use serde::{Deserialize, Serialize};

use crate::error::{ModelError, ModelResult};
use crate::segment::JobStatus;

/// One record of a queue delivery batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueueRecord {
    #[serde(default)]
    pub message_id: Option<String>,
    pub receipt_handle: String,
    pub body: String,
}

/// A delivery of queue records.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueBatch {
    #[serde(rename = "Records", default)]
    pub records: Vec<QueueRecord>,
}

impl QueueBatch {
    /// Parse a delivery from raw JSON.
    pub fn from_json(json: &str) -> ModelResult<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Location of the analysed video.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoLocation {
    #[serde(rename = "S3ObjectName")]
    pub object_name: String,
    #[serde(rename = "S3Bucket")]
    pub bucket: String,
}

/// Completion notification of a segmentation job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SegmentationNotification {
    pub job_id: String,
    pub status: String,
    pub video: VideoLocation,
    #[serde(rename = "API", default, skip_serializing_if = "Option::is_none")]
    pub api: Option<String>,
}

#[derive(Debug, Deserialize)]
struct NotificationEnvelope {
    #[serde(rename = "Message")]
    message: Option<String>,
}

impl SegmentationNotification {
    /// Decode the notification carried in a queue record body.
    pub fn from_record_body(body: &str) -> ModelResult<Self> {
        let envelope: NotificationEnvelope = serde_json::from_str(body)?;
        let message = envelope.message.ok_or(ModelError::MissingField("Message"))?;
        let notification: Self = serde_json::from_str(&message)?;

        if notification.job_id.is_empty() {
            return Err(ModelError::MissingField("JobId"));
        }
        if notification.video.object_name.is_empty() {
            return Err(ModelError::MissingField("Video.S3ObjectName"));
        }
        if notification.video.bucket.is_empty() {
            return Err(ModelError::MissingField("Video.S3Bucket"));
        }

        Ok(notification)
    }

    /// Job status as announced by the notification.
    pub fn job_status(&self) -> JobStatus {
        JobStatus::parse(&self.status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn body(message: &str) -> String {
        serde_json::json!({ "Type": "Notification", "Message": message }).to_string()
    }

    #[test]
    fn test_from_record_body() {
        let message = r#"{"JobId":"job-42","Status":"SUCCEEDED","API":"StartSegmentDetection",
            "Video":{"S3ObjectName":"clip-iframe-output.mp4","S3Bucket":"processed"}}"#;

        let notification = SegmentationNotification::from_record_body(&body(message)).unwrap();
        assert_eq!(notification.job_id, "job-42");
        assert_eq!(notification.job_status(), JobStatus::Succeeded);
        assert_eq!(notification.video.object_name, "clip-iframe-output.mp4");
        assert_eq!(notification.video.bucket, "processed");
    }

    #[test]
    fn test_missing_message_field() {
        let err = SegmentationNotification::from_record_body(r#"{"Type":"Notification"}"#).unwrap_err();
        assert!(matches!(err, ModelError::MissingField("Message")));
    }

    #[test]
    fn test_missing_video_field() {
        let message = r#"{"JobId":"job-42","Status":"SUCCEEDED"}"#;
        let err = SegmentationNotification::from_record_body(&body(message)).unwrap_err();
        assert!(matches!(err, ModelError::Json(_)));
    }

    #[test]
    fn test_empty_job_id() {
        let message = r#"{"JobId":"","Status":"SUCCEEDED","Video":{"S3ObjectName":"a.mp4","S3Bucket":"b"}}"#;
        let err = SegmentationNotification::from_record_body(&body(message)).unwrap_err();
        assert!(matches!(err, ModelError::MissingField("JobId")));
    }

    #[test]
    fn test_queue_batch() {
        let batch = QueueBatch::from_json(
            r#"{"Records":[{"messageId":"m-1","receiptHandle":"rh-1","body":"{}"},
                           {"receiptHandle":"rh-2","body":"not json"}]}"#,
        )
        .unwrap();
        assert_eq!(batch.records.len(), 2);
        assert_eq!(batch.records[1].message_id, None);
    }

    #[test]
    fn test_queue_record_shape() {
        let record: QueueRecord = serde_json::from_str(
            r#"{"messageId":"m-1","receiptHandle":"rh-1","body":"{}","attributes":{}}"#,
        )
        .unwrap();
        assert_eq!(record.receipt_handle, "rh-1");
        assert_eq!(record.message_id.as_deref(), Some("m-1"));
    }
}
