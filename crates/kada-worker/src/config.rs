//! Worker configuration.

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use kada_models::{SourceIdentity, DEFAULT_SOURCE_SUFFIXES};
use kada_queue::QueueConfig;
use kada_records::RecordStoreConfig;

use crate::error::{WorkerError, WorkerResult};

/// Worker configuration.
#[derive(Debug, Clone)]
pub struct WorkerConfig {
    /// Queue delivering segmentation notifications (resolver trigger)
    pub queue_url: Option<String>,
    /// Event bus receiving shots-and-GIF events
    pub event_bus_name: String,
    /// Table holding media records (renderer)
    pub table_name: Option<String>,
    /// Work directory for scratch files
    pub work_dir: PathBuf,
    /// Maximum segments requested per query page
    pub segment_page_size: i32,
    /// Publish attempts before giving up
    pub publish_max_attempts: u32,
    /// Fixed pause between publish attempts
    pub publish_backoff: Duration,
    /// Time budget of every FFmpeg/FFprobe invocation
    pub ffmpeg_timeout: Duration,
    /// Lifetime of signed source URLs
    pub signed_url_ttl: Duration,
    /// Suffixes that mark a processed copy of an original upload
    pub source_suffixes: Vec<String>,
    /// Stop resolving when the job reports FAILED on its first page
    pub fail_on_job_failure: bool,
    /// Prometheus exporter port; no exporter when unset
    pub metrics_port: Option<u16>,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            queue_url: None,
            event_bus_name: "default".to_string(),
            table_name: None,
            work_dir: PathBuf::from("/tmp/kada"),
            segment_page_size: 10,
            publish_max_attempts: 3,
            publish_backoff: Duration::from_secs(5),
            ffmpeg_timeout: Duration::from_secs(600),
            signed_url_ttl: Duration::from_secs(60 * 60 * 24 * 7),
            source_suffixes: DEFAULT_SOURCE_SUFFIXES.iter().map(|s| s.to_string()).collect(),
            fail_on_job_failure: true,
            metrics_port: None,
        }
    }
}

impl WorkerConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Create config from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
        let parse = |name: &str| var(name).and_then(|v| v.trim().parse::<u64>().ok());

        Self {
            queue_url: var("QUEUE_URL"),
            event_bus_name: var("EVENT_BUS_NAME").unwrap_or(defaults.event_bus_name),
            table_name: var("DYNAMODB_TABLE"),
            work_dir: var("WORKER_WORK_DIR").map(PathBuf::from).unwrap_or(defaults.work_dir),
            segment_page_size: parsed(var("SEGMENT_PAGE_SIZE"), defaults.segment_page_size),
            publish_max_attempts: parsed(var("PUBLISH_MAX_ATTEMPTS"), defaults.publish_max_attempts)
                .max(1),
            publish_backoff: parse("PUBLISH_BACKOFF_SECS")
                .map(Duration::from_secs)
                .unwrap_or(defaults.publish_backoff),
            ffmpeg_timeout: parse("FFMPEG_TIMEOUT_SECS")
                .map(Duration::from_secs)
                .unwrap_or(defaults.ffmpeg_timeout),
            signed_url_ttl: parse("SIGNED_URL_TTL_SECS")
                .map(Duration::from_secs)
                .unwrap_or(defaults.signed_url_ttl),
            source_suffixes: var("SOURCE_SUFFIXES")
                .map(|v| {
                    v.split(',')
                        .map(|s| s.trim().to_string())
                        .filter(|s| !s.is_empty())
                        .collect()
                })
                .unwrap_or(defaults.source_suffixes),
            fail_on_job_failure: var("FAIL_ON_JOB_FAILURE")
                .map(|v| !matches!(v.trim().to_ascii_lowercase().as_str(), "0" | "false" | "no"))
                .unwrap_or(defaults.fail_on_job_failure),
            metrics_port: var("METRICS_PORT").and_then(|v| v.trim().parse().ok()),
        }
    }

    /// Mapping from processed keys back to original uploads.
    pub fn source_identity(&self) -> SourceIdentity {
        SourceIdentity::new(self.source_suffixes.iter().cloned())
    }

    /// Queue settings; required by the resolver trigger.
    pub fn queue_config(&self) -> WorkerResult<QueueConfig> {
        let queue_url = self
            .queue_url
            .clone()
            .ok_or_else(|| WorkerError::config_error("QUEUE_URL not set"))?;
        Ok(QueueConfig { queue_url })
    }

    /// Record store settings; required by the renderer trigger.
    pub fn record_store_config(&self) -> WorkerResult<RecordStoreConfig> {
        let table_name = self
            .table_name
            .clone()
            .ok_or_else(|| WorkerError::config_error("DYNAMODB_TABLE not set"))?;
        Ok(RecordStoreConfig { table_name })
    }
}

fn parsed<T: FromStr>(value: Option<String>, default: T) -> T {
    value.and_then(|v| v.trim().parse().ok()).unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> WorkerConfig {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        WorkerConfig::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config(&[]);
        assert_eq!(config.segment_page_size, 10);
        assert_eq!(config.publish_max_attempts, 3);
        assert_eq!(config.publish_backoff, Duration::from_secs(5));
        assert_eq!(config.signed_url_ttl, Duration::from_secs(604_800));
        assert_eq!(config.work_dir, PathBuf::from("/tmp/kada"));
        assert!(config.fail_on_job_failure);
        assert!(config.queue_config().is_err());
        assert!(config.record_store_config().is_err());
    }

    #[test]
    fn test_overrides() {
        let config = config(&[
            ("QUEUE_URL", "https://sqs.example/123/kada"),
            ("EVENT_BUS_NAME", "kada-bus"),
            ("DYNAMODB_TABLE", "media"),
            ("PUBLISH_MAX_ATTEMPTS", "5"),
            ("PUBLISH_BACKOFF_SECS", "1"),
            ("SOURCE_SUFFIXES", "-proxy, -iframe-output,"),
            ("FAIL_ON_JOB_FAILURE", "false"),
            ("METRICS_PORT", "9100"),
        ]);

        assert_eq!(config.queue_config().unwrap().queue_url, "https://sqs.example/123/kada");
        assert_eq!(config.record_store_config().unwrap().table_name, "media");
        assert_eq!(config.event_bus_name, "kada-bus");
        assert_eq!(config.publish_max_attempts, 5);
        assert_eq!(config.publish_backoff, Duration::from_secs(1));
        assert_eq!(config.source_suffixes, vec!["-proxy", "-iframe-output"]);
        assert!(!config.fail_on_job_failure);
        assert_eq!(config.metrics_port, Some(9100));
    }

    #[test]
    fn test_invalid_numbers_fall_back() {
        let config = config(&[("SEGMENT_PAGE_SIZE", "ten"), ("PUBLISH_MAX_ATTEMPTS", "0")]);
        assert_eq!(config.segment_page_size, 10);
        assert_eq!(config.publish_max_attempts, 1);
    }
}
