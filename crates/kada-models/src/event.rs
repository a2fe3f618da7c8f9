//! Event-bus payloads exchanged between the resolver and the renderer.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ModelResult;
use crate::segment::SegmentBatch;

/// Event source used for pipeline-internal events.
pub const EVENT_SOURCE_CUSTOM: &str = "custom";

/// Detail type of the "slice shots and render GIFs" event.
pub const DETAIL_TYPE_SHOTS_AND_GIF: &str = "videoShotsAndGif";

/// Inbound event as delivered to the renderer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventEnvelope {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub source: String,
    #[serde(rename = "detail-type")]
    pub detail_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time: Option<String>,
    pub detail: SegmentBatch,
}

impl EventEnvelope {
    /// Parse an envelope from raw JSON.
    pub fn from_json(json: &str) -> ModelResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Whether this event asks for shot slicing and GIF rendering.
    pub fn is_shots_and_gif(&self) -> bool {
        self.source == EVENT_SOURCE_CUSTOM && self.detail_type == DETAIL_TYPE_SHOTS_AND_GIF
    }
}

/// Outbound event-bus entry carrying one segment batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PublishEntry {
    pub time: DateTime<Utc>,
    pub source: String,
    pub event_bus_name: String,
    pub detail_type: String,
    /// JSON-encoded [`SegmentBatch`]
    pub detail: String,
}

impl PublishEntry {
    /// Package a batch as a shots-and-GIF event.
    pub fn shots_and_gif(batch: &SegmentBatch, event_bus_name: impl Into<String>) -> ModelResult<Self> {
        Ok(Self {
            time: Utc::now(),
            source: EVENT_SOURCE_CUSTOM.to_string(),
            event_bus_name: event_bus_name.into(),
            detail_type: DETAIL_TYPE_SHOTS_AND_GIF.to_string(),
            detail: serde_json::to_string(batch)?,
        })
    }

    /// Decode the batch carried in `detail`.
    pub fn batch(&self) -> ModelResult<SegmentBatch> {
        Ok(serde_json::from_str(&self.detail)?)
    }
}
