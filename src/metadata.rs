//! Capture time extraction.
//!
//! Videos are queried with `ffprobe`, which emits the stream metadata as JSON.
//! Photos are read from the embedded EXIF data.

use std::collections::HashMap;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::process::Command;

use chrono::NaiveDateTime;
use exif::{In, Reader, Tag, Value};
use serde::Deserialize;

use crate::error::{RenameError, Result};
use crate::media::MediaKind;

/// `creation_time` prefix format in ffprobe tags, e.g. `2018-03-04T12:30:45.000000Z`.
const CREATION_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// EXIF date time format, e.g. `2018:03:04 12:30:45`.
const EXIF_DATETIME_FORMAT: &str = "%Y:%m:%d %H:%M:%S";

/// Number of characters in `YYYY-MM-DDTHH:MM:SS`.
const DATETIME_LENGTH: usize = 19;

/// Source of capture timestamps for media files.
pub trait MetadataSource {
    /// Read the capture time of the file at `path`.
    ///
    /// # Errors
    /// Returns `MetadataUnavailable` if the file has no usable timestamp,
    /// or `UnsupportedExtension` for files that are neither video nor image.
    fn capture_time(&self, path: &Path, kind: MediaKind) -> Result<NaiveDateTime>;
}

/// Reads capture times with `ffprobe` for videos and EXIF for photos.
#[derive(Debug, Clone)]
pub struct CameraMetadata {
    ffprobe: PathBuf,
}

#[derive(Debug, Default, Deserialize)]
struct ProbeOutput {
    #[serde(default)]
    streams: Vec<ProbeEntry>,
    #[serde(default)]
    format: Option<ProbeEntry>,
}

#[derive(Debug, Default, Deserialize)]
struct ProbeEntry {
    #[serde(default)]
    tags: HashMap<String, String>,
}

impl CameraMetadata {
    /// Create a metadata reader using the given `ffprobe` executable.
    pub fn new(ffprobe: impl Into<PathBuf>) -> Self {
        Self {
            ffprobe: ffprobe.into(),
        }
    }

    /// Check that the `ffprobe` executable can be run.
    #[must_use]
    pub fn ffprobe_available(&self) -> bool {
        Command::new(&self.ffprobe)
            .arg("-version")
            .output()
            .is_ok_and(|output| output.status.success())
    }

    fn video_capture_time(&self, path: &Path) -> Result<NaiveDateTime> {
        let output = Command::new(&self.ffprobe)
            .args(["-v", "quiet", "-print_format", "json", "-show_format", "-show_streams"])
            .arg(path)
            .output()
            .map_err(|error| RenameError::metadata(path, format!("failed to run ffprobe: {error}")))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(RenameError::metadata(
                path,
                format!("ffprobe exited with {}: {}", output.status, stderr.trim()),
            ));
        }

        parse_ffprobe_output(&output.stdout).map_err(|reason| RenameError::metadata(path, reason))
    }

    fn image_capture_time(path: &Path) -> Result<NaiveDateTime> {
        let file = File::open(path).map_err(|error| RenameError::metadata(path, error.to_string()))?;
        let mut reader = BufReader::new(file);
        let exif = Reader::new()
            .read_from_container(&mut reader)
            .map_err(|error| RenameError::metadata(path, format!("failed to read EXIF: {error}")))?;

        let field = exif
            .get_field(Tag::DateTimeOriginal, In::PRIMARY)
            .or_else(|| exif.get_field(Tag::DateTime, In::PRIMARY))
            .ok_or_else(|| RenameError::metadata(path, "no DateTimeOriginal tag"))?;

        // Use the raw ASCII value, `display_value()` wraps it in quotes.
        let value = match &field.value {
            Value::Ascii(values) if !values.is_empty() => String::from_utf8_lossy(&values[0]).into_owned(),
            _ => field.display_value().to_string(),
        };

        parse_exif_datetime(&value)
            .ok_or_else(|| RenameError::metadata(path, format!("invalid EXIF date time '{value}'")))
    }
}

impl Default for CameraMetadata {
    fn default() -> Self {
        Self::new("ffprobe")
    }
}

impl MetadataSource for CameraMetadata {
    fn capture_time(&self, path: &Path, kind: MediaKind) -> Result<NaiveDateTime> {
        match kind {
            MediaKind::Video => self.video_capture_time(path),
            MediaKind::Image => Self::image_capture_time(path),
            MediaKind::Unsupported => Err(RenameError::UnsupportedExtension {
                name: crate::path_to_filename_string(path),
                extension: path
                    .extension()
                    .map(|ext| format!(".{}", crate::os_str_to_string(ext)))
                    .unwrap_or_default(),
            }),
        }
    }
}

/// Parse the capture time from ffprobe JSON output.
///
/// The first stream with a `creation_time` tag wins, the container tags are used as a fallback.
///
/// # Errors
/// Returns a description of the problem if the output is not valid JSON
/// or contains no parseable `creation_time`.
pub fn parse_ffprobe_output(output: &[u8]) -> std::result::Result<NaiveDateTime, String> {
    let probe: ProbeOutput =
        serde_json::from_slice(output).map_err(|error| format!("failed to parse ffprobe output: {error}"))?;

    let creation_time = probe
        .streams
        .iter()
        .chain(probe.format.iter())
        .find_map(|entry| entry.tags.get("creation_time"))
        .ok_or_else(|| "no creation_time tag".to_string())?;

    parse_creation_time(creation_time).ok_or_else(|| format!("invalid creation_time '{creation_time}'"))
}

/// Parse the first 19 characters of a `creation_time` tag.
///
/// ```rust
/// use gopro_rename::metadata::parse_creation_time;
///
/// let time = parse_creation_time("2018-03-04T12:30:45.000000Z").unwrap();
/// assert_eq!(time.to_string(), "2018-03-04 12:30:45");
/// ```
#[must_use]
pub fn parse_creation_time(value: &str) -> Option<NaiveDateTime> {
    let value = value.trim().get(..DATETIME_LENGTH)?;
    NaiveDateTime::parse_from_str(value, CREATION_TIME_FORMAT).ok()
}

/// Parse an EXIF `DateTimeOriginal` value.
#[must_use]
pub fn parse_exif_datetime(value: &str) -> Option<NaiveDateTime> {
    let value = value.trim().trim_matches('"').trim_end_matches('\0');
    NaiveDateTime::parse_from_str(value, EXIF_DATETIME_FORMAT).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    use chrono::{Datelike, Timelike};

    const FFPROBE_OUTPUT: &str = r#"{
        "streams": [
            {
                "index": 0,
                "codec_name": "h264",
                "tags": {
                    "creation_time": "2018-03-04T12:30:45.000000Z",
                    "language": "eng",
                    "handler_name": "GoPro AVC"
                }
            },
            {
                "index": 1,
                "codec_name": "aac",
                "tags": {
                    "creation_time": "2018-03-04T12:30:46.000000Z"
                }
            }
        ],
        "format": {
            "filename": "GOPR1234.MP4",
            "tags": {
                "creation_time": "2019-01-01T00:00:00.000000Z"
            }
        }
    }"#;

    #[test]
    fn ffprobe_first_stream_wins() {
        let time = parse_ffprobe_output(FFPROBE_OUTPUT.as_bytes()).unwrap();
        assert_eq!(time.year(), 2018);
        assert_eq!(time.month(), 3);
        assert_eq!(time.day(), 4);
        assert_eq!(time.hour(), 12);
        assert_eq!(time.minute(), 30);
        assert_eq!(time.second(), 45);
    }

    #[test]
    fn ffprobe_skips_streams_without_tag() {
        let output = r#"{
            "streams": [
                {"index": 0, "codec_name": "bin_data"},
                {"index": 1, "tags": {"creation_time": "2020-07-15T08:09:10.000000Z"}}
            ]
        }"#;
        let time = parse_ffprobe_output(output.as_bytes()).unwrap();
        assert_eq!(time.to_string(), "2020-07-15 08:09:10");
    }

    #[test]
    fn ffprobe_falls_back_to_format_tags() {
        let output = r#"{
            "streams": [{"index": 0, "tags": {"language": "eng"}}],
            "format": {"tags": {"creation_time": "2021-12-31T23:59:59.000000Z"}}
        }"#;
        let time = parse_ffprobe_output(output.as_bytes()).unwrap();
        assert_eq!(time.to_string(), "2021-12-31 23:59:59");
    }

    #[test]
    fn ffprobe_missing_creation_time() {
        let output = r#"{"streams": [{"index": 0, "tags": {"language": "eng"}}]}"#;
        let error = parse_ffprobe_output(output.as_bytes()).unwrap_err();
        assert!(error.contains("no creation_time"));
    }

    #[test]
    fn ffprobe_empty_object() {
        assert!(parse_ffprobe_output(b"{}").is_err());
    }

    #[test]
    fn ffprobe_invalid_json() {
        let error = parse_ffprobe_output(b"not json").unwrap_err();
        assert!(error.contains("failed to parse"));
    }

    #[test]
    fn creation_time_without_fraction() {
        let time = parse_creation_time("2018-03-04T12:30:45").unwrap();
        assert_eq!(time.to_string(), "2018-03-04 12:30:45");
    }

    #[test]
    fn creation_time_too_short() {
        assert!(parse_creation_time("2018-03-04").is_none());
        assert!(parse_creation_time("").is_none());
    }

    #[test]
    fn creation_time_invalid_date() {
        assert!(parse_creation_time("2018-13-04T12:30:45Z").is_none());
    }

    #[test]
    fn exif_datetime() {
        let time = parse_exif_datetime("2018:03:04 12:30:45").unwrap();
        assert_eq!(time.to_string(), "2018-03-04 12:30:45");
    }

    #[test]
    fn exif_datetime_quoted_and_padded() {
        assert!(parse_exif_datetime("\"2018:03:04 12:30:45\"").is_some());
        assert!(parse_exif_datetime("2018:03:04 12:30:45\0").is_some());
    }

    #[test]
    fn exif_datetime_wrong_separator() {
        assert!(parse_exif_datetime("2018-03-04 12:30:45").is_none());
    }

    #[test]
    fn unsupported_kind_is_not_queried() {
        let metadata = CameraMetadata::new("ffprobe-does-not-exist");
        let result = metadata.capture_time(Path::new("GOPR1234.THM"), MediaKind::Unsupported);
        assert!(matches!(
            result,
            Err(RenameError::UnsupportedExtension { ref extension, .. }) if extension == ".THM"
        ));
    }

    #[test]
    fn missing_ffprobe_is_metadata_error() {
        let metadata = CameraMetadata::new("ffprobe-does-not-exist");
        assert!(!metadata.ffprobe_available());
        let result = metadata.capture_time(Path::new("GOPR1234.MP4"), MediaKind::Video);
        assert!(matches!(result, Err(RenameError::MetadataUnavailable { .. })));
    }

    #[test]
    fn image_without_exif_is_metadata_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("GOPR1215.JPG");
        std::fs::write(&path, b"not a jpeg").unwrap();
        let result = CameraMetadata::default().capture_time(&path, MediaKind::Image);
        assert!(matches!(result, Err(RenameError::MetadataUnavailable { .. })));
    }

    #[test]
    fn missing_image_is_metadata_error() {
        let result = CameraMetadata::default().capture_time(Path::new("/nonexistent/GOPR1215.JPG"), MediaKind::Image);
        assert!(matches!(result, Err(RenameError::MetadataUnavailable { .. })));
    }
}
