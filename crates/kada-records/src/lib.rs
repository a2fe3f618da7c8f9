//! Media record store for the Kada pipeline.
//!
//! Records are keyed by the original upload's object key and carry the
//! derived clip and GIF locations once slicing has run.

pub mod error;
pub mod metrics;
pub mod store;

pub use error::{RecordError, RecordResult};
pub use store::{DynamoRecordStore, RecordStore, RecordStoreConfig};
