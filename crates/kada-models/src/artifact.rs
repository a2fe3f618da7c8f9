//! Derived clip/GIF artifacts and source identity mapping.

use serde::{Deserialize, Serialize};

use crate::segment::Segment;

/// Suffix appended to the analysed copy of an uploaded video.
pub const DEFAULT_SOURCE_SUFFIXES: &[&str] = &["-iframe-output"];

/// File name tail of a sliced clip.
const CLIP_SUFFIX: &str = "-sliced-output.mp4";

/// File name tail of a rendered GIF.
const GIF_SUFFIX: &str = "-sliced-output.gif";

/// Stem of an object key: the key without the extension of its last path
/// segment. Dots in parent "directories" are left alone.
///
/// # Examples
/// ```
/// use kada_models::artifact::object_stem;
/// assert_eq!(object_stem("clip-iframe-output.mp4"), "clip-iframe-output");
/// assert_eq!(object_stem("v1.2/clip.mp4"), "v1.2/clip");
/// assert_eq!(object_stem("noext"), "noext");
/// ```
pub fn object_stem(key: &str) -> &str {
    match split_extension(key) {
        Some((stem, _)) => stem,
        None => key,
    }
}

/// Extension of the last path segment of an object key, without the dot.
pub fn object_extension(key: &str) -> Option<&str> {
    split_extension(key).map(|(_, ext)| ext)
}

fn split_extension(key: &str) -> Option<(&str, &str)> {
    let name_start = key.rfind('/').map(|i| i + 1).unwrap_or(0);
    let dot = key[name_start..].rfind('.')?;
    // Hidden-file style names (".mp4") have no stem to keep.
    if dot == 0 {
        return None;
    }
    let dot = name_start + dot;
    Some((&key[..dot], &key[dot + 1..]))
}

/// Maps a processed object key back to the key of the original upload.
///
/// Rules:
/// 1. Split the key into stem and extension (see [`object_stem`]).
/// 2. Remove the first configured suffix the stem ends with. Only one suffix
///    is removed, and only at the end of the stem.
/// 3. Re-append the extension.
///
/// A key with no matching suffix maps to itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceIdentity {
    suffixes: Vec<String>,
}

impl Default for SourceIdentity {
    fn default() -> Self {
        Self::new(DEFAULT_SOURCE_SUFFIXES.iter().copied())
    }
}

impl SourceIdentity {
    pub fn new<I, S>(suffixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            suffixes: suffixes
                .into_iter()
                .map(Into::into)
                .filter(|s: &String| !s.is_empty())
                .collect(),
        }
    }

    pub fn suffixes(&self) -> &[String] {
        &self.suffixes
    }

    /// Key of the original upload the processed object was derived from.
    pub fn original_key(&self, processed_key: &str) -> String {
        let stem = object_stem(processed_key);
        let original_stem = self
            .suffixes
            .iter()
            .find_map(|suffix| stem.strip_suffix(suffix.as_str()))
            .filter(|s| !s.is_empty() && !s.ends_with('/'))
            .unwrap_or(stem);

        match object_extension(processed_key) {
            Some(ext) => format!("{}.{}", original_stem, ext),
            None => original_stem.to_string(),
        }
    }
}

/// Storage locations derived from one segment of a source video.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClipArtifact {
    pub source_object: String,
    pub segment_key: String,
    pub video_key: String,
    pub gif_key: String,
}

impl ClipArtifact {
    /// Deterministic keys for a segment: `<stem>/<start>-<duration>-sliced-output.{mp4,gif}`.
    pub fn for_segment(source_object: &str, segment: &Segment) -> Self {
        let stem = object_stem(source_object);
        let segment_key = segment.segment_key();

        Self {
            source_object: source_object.to_string(),
            video_key: format!("{}/{}{}", stem, segment_key, CLIP_SUFFIX),
            gif_key: format!("{}/{}{}", stem, segment_key, GIF_SUFFIX),
            segment_key,
        }
    }

    /// File name of the clip (last path segment of `video_key`).
    pub fn video_file_name(&self) -> String {
        file_name(&self.video_key).replace(':', "_")
    }

    /// File name of the GIF (last path segment of `gif_key`).
    pub fn gif_file_name(&self) -> String {
        file_name(&self.gif_key).replace(':', "_")
    }
}

fn file_name(key: &str) -> &str {
    key.rsplit('/').next().unwrap_or(key)
}

/// Record stored against the original upload once slicing has run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SlicedMediaRecord {
    pub sliced_videos: Vec<String>,
    pub sliced_gifs: Vec<String>,
    pub s3_bucket: String,
}

impl SlicedMediaRecord {
    /// Build the record from the artifacts of every segment, in segment order.
    pub fn from_artifacts(artifacts: &[ClipArtifact], bucket: impl Into<String>) -> Self {
        Self {
            sliced_videos: artifacts.iter().map(|a| a.video_key.clone()).collect(),
            sliced_gifs: artifacts.iter().map(|a| a.gif_key.clone()).collect(),
            s3_bucket: bucket.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::segment::SegmentType;

    fn segment(start: &str, duration: &str) -> Segment {
        Segment {
            segment_type: SegmentType::Shot,
            start_timecode: start.to_string(),
            duration_timecode: duration.to_string(),
            start_millis: 60_000,
            end_millis: 70_000,
            duration_millis: 10_000,
        }
    }

    #[test]
    fn test_object_stem_and_extension() {
        assert_eq!(object_stem("a/b/c.mp4"), "a/b/c");
        assert_eq!(object_extension("a/b/c.mp4"), Some("mp4"));
        assert_eq!(object_stem("archive.tar.gz"), "archive.tar");
        assert_eq!(object_extension("dir.v2/file"), None);
        assert_eq!(object_stem(".mp4"), ".mp4");
    }

    #[test]
    fn test_original_key_strips_known_suffix() {
        let identity = SourceIdentity::default();
        assert_eq!(
            identity.original_key("SampleVideo_1280x720_30mb-iframe-output.mp4"),
            "SampleVideo_1280x720_30mb.mp4"
        );
        // Hyphens inside the original name survive.
        assert_eq!(
            identity.original_key("clip_sample-01-iframe-output.mp4"),
            "clip_sample-01.mp4"
        );
    }

    #[test]
    fn test_original_key_without_suffix_is_identity() {
        let identity = SourceIdentity::default();
        assert_eq!(identity.original_key("plain-video.mp4"), "plain-video.mp4");
        assert_eq!(identity.original_key("uploads/raw.mov"), "uploads/raw.mov");
    }

    #[test]
    fn test_original_key_suffix_only_at_end() {
        let identity = SourceIdentity::default();
        assert_eq!(
            identity.original_key("a-iframe-output-b.mp4"),
            "a-iframe-output-b.mp4"
        );
        // Removing the suffix must leave a name behind.
        assert_eq!(identity.original_key("-iframe-output.mp4"), "-iframe-output.mp4");
    }

    #[test]
    fn test_original_key_first_matching_suffix_wins() {
        let identity = SourceIdentity::new(["-proxy", "-iframe-output"]);
        assert_eq!(identity.original_key("v-iframe-output.mp4"), "v.mp4");
        assert_eq!(identity.original_key("v-proxy.mp4"), "v.mp4");
        assert_eq!(identity.original_key("v-iframe-output-proxy.mp4"), "v-iframe-output.mp4");
    }

    #[test]
    fn test_clip_artifact_keys() {
        let artifact = ClipArtifact::for_segment("clip-iframe-output.mp4", &segment("00:01:00", "00:00:10"));
        assert_eq!(artifact.segment_key, "00:01:00-00:00:10");
        assert_eq!(
            artifact.video_key,
            "clip-iframe-output/00:01:00-00:00:10-sliced-output.mp4"
        );
        assert_eq!(
            artifact.gif_key,
            "clip-iframe-output/00:01:00-00:00:10-sliced-output.gif"
        );
        assert_eq!(artifact.video_file_name(), "00_01_00-00_00_10-sliced-output.mp4");
    }

    #[test]
    fn test_record_serializes_schema() {
        let artifacts = vec![ClipArtifact::for_segment("v.mp4", &segment("00:00:00", "00:00:05"))];
        let record = SlicedMediaRecord::from_artifacts(&artifacts, "bucket");

        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["slicedVideos"][0], "v/00:00:00-00:00:05-sliced-output.mp4");
        assert_eq!(value["slicedGifs"][0], "v/00:00:00-00:00:05-sliced-output.gif");
        assert_eq!(value["s3Bucket"], "bucket");
    }
}
