//! In-memory implementations of the worker's service seams for tests.

use std::collections::VecDeque;
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use kada_media::{ClipTranscoder, MediaError, MediaResult};
use kada_models::{
    PublishEntry, RawSegment, Segment, SegmentBatch, SegmentPage, SegmentType, SlicedMediaRecord,
};
use kada_queue::{EventPublisher, MessageQueue, PublishAck, QueueError, QueueResult};
use kada_records::{RecordError, RecordResult, RecordStore};
use kada_storage::{ObjectStore, StorageError, StorageResult};

use crate::error::{WorkerError, WorkerResult};
use crate::resolver::SegmentQuery;

/// Ordered log of calls shared between fakes.
#[derive(Debug, Clone, Default)]
pub struct Journal(Arc<Mutex<Vec<String>>>);

impl Journal {
    pub fn push(&self, entry: String) {
        self.0.lock().unwrap().push(entry);
    }

    pub fn entries(&self) -> Vec<String> {
        self.0.lock().unwrap().clone()
    }
}

pub fn raw_segment(segment_type: SegmentType, start: &str, duration: &str) -> RawSegment {
    RawSegment {
        segment_type,
        start_timecode: start.to_string(),
        duration_timecode: duration.to_string(),
        start_millis: 0,
        end_millis: 4_417,
        duration_millis: 4_417,
    }
}

pub fn sample_segments() -> Vec<Segment> {
    [("00:00:00:00", "00:00:04:10"), ("00:00:04:10", "00:00:06:02")]
        .iter()
        .filter_map(|(start, duration)| Segment::from_raw(&raw_segment(SegmentType::Shot, start, duration)))
        .collect()
}

pub fn sample_batch() -> SegmentBatch {
    SegmentBatch::new("job-1", "clip-iframe-output.mp4", "processed", sample_segments())
}

pub fn notification_body(job_id: &str, object: &str) -> String {
    let message = serde_json::json!({
        "JobId": job_id,
        "Status": "SUCCEEDED",
        "API": "StartSegmentDetection",
        "Video": { "S3ObjectName": object, "S3Bucket": "processed" }
    });
    serde_json::json!({ "Type": "Notification", "Message": message.to_string() }).to_string()
}

pub struct FakeSegmentQuery {
    pages: Mutex<VecDeque<SegmentPage>>,
    cursors: Mutex<Vec<Option<String>>>,
    fail: bool,
    journal: Option<Journal>,
}

impl FakeSegmentQuery {
    pub fn new(pages: Vec<SegmentPage>) -> Self {
        Self {
            pages: Mutex::new(pages.into()),
            cursors: Mutex::new(Vec::new()),
            fail: false,
            journal: None,
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::new(Vec::new())
        }
    }

    pub fn with_journal(mut self, journal: Journal) -> Self {
        self.journal = Some(journal);
        self
    }

    /// Cursor of every query made, in order.
    pub fn cursors(&self) -> Vec<Option<String>> {
        self.cursors.lock().unwrap().clone()
    }
}

#[async_trait]
impl SegmentQuery for FakeSegmentQuery {
    async fn get_page(&self, job_id: &str, cursor: Option<&str>, _max_results: i32) -> WorkerResult<SegmentPage> {
        self.cursors.lock().unwrap().push(cursor.map(str::to_string));
        if let Some(journal) = &self.journal {
            journal.push(format!("query:{}", job_id));
        }
        if self.fail {
            return Err(WorkerError::job_query("access denied"));
        }
        self.pages
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| WorkerError::job_query("no more pages"))
    }
}

pub struct FakePublisher {
    responses: Mutex<VecDeque<Result<PublishAck, String>>>,
    entries: Mutex<Vec<PublishEntry>>,
}

impl FakePublisher {
    pub fn new(responses: Vec<Result<PublishAck, String>>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
            entries: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> usize {
        self.entries.lock().unwrap().len()
    }

    pub fn entries(&self) -> Vec<PublishEntry> {
        self.entries.lock().unwrap().clone()
    }
}

#[async_trait]
impl EventPublisher for FakePublisher {
    async fn put_event(&self, entry: &PublishEntry) -> QueueResult<PublishAck> {
        self.entries.lock().unwrap().push(entry.clone());
        match self.responses.lock().unwrap().pop_front() {
            Some(Ok(ack)) => Ok(ack),
            Some(Err(e)) => Err(QueueError::publish_failed(e)),
            None => Err(QueueError::publish_failed("no response scripted")),
        }
    }
}

pub struct FakeQueue {
    journal: Journal,
    deleted: Mutex<Vec<String>>,
}

impl FakeQueue {
    pub fn new(journal: Journal) -> Self {
        Self {
            journal,
            deleted: Mutex::new(Vec::new()),
        }
    }

    pub fn deleted(&self) -> Vec<String> {
        self.deleted.lock().unwrap().clone()
    }
}

#[async_trait]
impl MessageQueue for FakeQueue {
    async fn delete_message(&self, receipt_handle: &str) -> QueueResult<()> {
        self.journal.push(format!("delete:{}", receipt_handle));
        self.deleted.lock().unwrap().push(receipt_handle.to_string());
        Ok(())
    }
}

#[derive(Default)]
pub struct FakeStore {
    fail_presign: bool,
    presigned: Mutex<usize>,
    uploads: Mutex<Vec<(String, String)>>,
}

impl FakeStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_presign() -> Self {
        Self {
            fail_presign: true,
            ..Self::default()
        }
    }

    pub fn presigned(&self) -> usize {
        *self.presigned.lock().unwrap()
    }

    /// `(bucket, key)` of every upload.
    pub fn uploaded_keys(&self) -> Vec<(String, String)> {
        self.uploads.lock().unwrap().clone()
    }
}

#[async_trait]
impl ObjectStore for FakeStore {
    async fn presign_get(&self, bucket: &str, key: &str, _expires_in: Duration) -> StorageResult<String> {
        if self.fail_presign {
            return Err(StorageError::presign_failed("no credentials"));
        }
        *self.presigned.lock().unwrap() += 1;
        Ok(format!("https://{}.example/{}?X-Amz-Signature=test", bucket, key))
    }

    async fn upload_file(&self, path: &Path, bucket: &str, key: &str) -> StorageResult<()> {
        if !path.exists() {
            return Err(StorageError::upload_failed(format!("{} missing", path.display())));
        }
        self.uploads
            .lock()
            .unwrap()
            .push((bucket.to_string(), key.to_string()));
        Ok(())
    }
}

#[derive(Default)]
pub struct FakeRecordStore {
    fail: bool,
    updates: Mutex<Vec<(String, SlicedMediaRecord)>>,
}

impl FakeRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn updates(&self) -> Vec<(String, SlicedMediaRecord)> {
        self.updates.lock().unwrap().clone()
    }
}

#[async_trait]
impl RecordStore for FakeRecordStore {
    async fn update_sliced_media(&self, key: &str, record: &SlicedMediaRecord) -> RecordResult<()> {
        if self.fail {
            return Err(RecordError::update_failed(key, "throttled"));
        }
        self.updates
            .lock()
            .unwrap()
            .push((key.to_string(), record.clone()));
        Ok(())
    }
}

/// Writes a placeholder file for every artifact.
#[derive(Default)]
pub struct FakeTranscoder {
    failing_gif: Option<usize>,
    calls: Mutex<usize>,
    gifs: Mutex<usize>,
}

impl FakeTranscoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail the GIF rendered for the `index`-th segment.
    pub fn failing_gif_at(index: usize) -> Self {
        Self {
            failing_gif: Some(index),
            ..Self::default()
        }
    }

    pub fn calls(&self) -> usize {
        *self.calls.lock().unwrap()
    }
}

#[async_trait]
impl ClipTranscoder for FakeTranscoder {
    async fn slice_clip(&self, _source: &str, _start: &str, _duration: &str, output: &Path) -> MediaResult<()> {
        *self.calls.lock().unwrap() += 1;
        std::fs::write(output, b"mp4")?;
        Ok(())
    }

    async fn render_gif(&self, _source: &str, _start: &str, _duration: &str, output: &Path) -> MediaResult<()> {
        *self.calls.lock().unwrap() += 1;
        let index = {
            let mut gifs = self.gifs.lock().unwrap();
            *gifs += 1;
            *gifs - 1
        };
        if self.failing_gif == Some(index) {
            return Err(MediaError::ffmpeg_failed("palettegen failed", None, Some(1)));
        }
        std::fs::write(output, b"gif")?;
        Ok(())
    }
}
