//! S3 object storage client.
//!
//! This crate provides:
//! - Presigned GET URLs for reading source videos
//! - File upload of derived artifacts
//! - The [`ObjectStore`] seam used by the renderer

pub mod client;
pub mod error;

pub use client::{ObjectStore, S3Client, S3Config, DEFAULT_SIGNED_URL_TTL};
pub use error::{StorageError, StorageResult};
