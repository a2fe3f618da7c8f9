//! Queue and event-bus plumbing for the Kada pipeline.
//!
//! This crate provides:
//! - Acknowledgement (deletion) of consumed queue messages
//! - Publishing of pipeline events onto the event bus

pub mod error;
pub mod publisher;
pub mod queue;

pub use error::{QueueError, QueueResult};
pub use publisher::{EventBridgePublisher, EventPublisher, PublishAck};
pub use queue::{MessageQueue, QueueConfig, SqsQueue};
