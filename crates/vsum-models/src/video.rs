//! Uploaded video models.

use std::fmt;
use std::path::Path;

use bytes::Bytes;
use serde::{Deserialize, Serialize};

/// Mime type used when the container cannot be determined.
pub const DEFAULT_VIDEO_MIME: &str = "video/mp4";

/// Accepted video container formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VideoFormat {
    Mp4,
    Mov,
    Avi,
}

impl VideoFormat {
    /// All accepted formats, in the order shown to users.
    pub const ALL: [VideoFormat; 3] = [VideoFormat::Mp4, VideoFormat::Mov, VideoFormat::Avi];

    /// Parse a file extension (without the leading dot), case-insensitively.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "mp4" => Some(VideoFormat::Mp4),
            "mov" => Some(VideoFormat::Mov),
            "avi" => Some(VideoFormat::Avi),
            _ => None,
        }
    }

    /// Detect the format from a filename or path.
    pub fn from_path(path: impl AsRef<Path>) -> Option<Self> {
        path.as_ref()
            .extension()
            .and_then(|ext| ext.to_str())
            .and_then(Self::from_extension)
    }

    pub fn extension(&self) -> &'static str {
        match self {
            VideoFormat::Mp4 => "mp4",
            VideoFormat::Mov => "mov",
            VideoFormat::Avi => "avi",
        }
    }

    pub fn mime_type(&self) -> &'static str {
        match self {
            VideoFormat::Mp4 => "video/mp4",
            VideoFormat::Mov => "video/quicktime",
            VideoFormat::Avi => "video/x-msvideo",
        }
    }

    /// Comma-separated list for an HTML `accept` attribute.
    pub fn accept_attribute() -> String {
        Self::ALL
            .iter()
            .map(|f| format!(".{}", f.extension()))
            .collect::<Vec<_>>()
            .join(",")
    }
}

impl fmt::Display for VideoFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.extension())
    }
}

/// Guess the mime type of a video from its path, falling back to [`DEFAULT_VIDEO_MIME`].
pub fn guess_mime_type(path: impl AsRef<Path>) -> &'static str {
    VideoFormat::from_path(path)
        .map(|f| f.mime_type())
        .unwrap_or(DEFAULT_VIDEO_MIME)
}

/// A video as received from the upload form.
#[derive(Debug, Clone)]
pub struct UploadedVideo {
    /// Filename declared by the client
    pub filename: String,
    /// Raw file contents
    pub bytes: Bytes,
}

impl UploadedVideo {
    pub fn new(filename: impl Into<String>, bytes: impl Into<Bytes>) -> Self {
        Self {
            filename: filename.into(),
            bytes: bytes.into(),
        }
    }

    /// Container format implied by the declared filename.
    pub fn format(&self) -> Option<VideoFormat> {
        VideoFormat::from_path(&self.filename)
    }

    /// Suffix for the transient file, including the leading dot.
    pub fn suffix(&self) -> String {
        match self.format() {
            Some(format) => format!(".{}", format.extension()),
            None => format!(".{}", VideoFormat::Mp4.extension()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_from_extension_is_case_insensitive() {
        assert_eq!(VideoFormat::from_extension("MP4"), Some(VideoFormat::Mp4));
        assert_eq!(VideoFormat::from_extension("Mov"), Some(VideoFormat::Mov));
        assert_eq!(VideoFormat::from_extension("avi"), Some(VideoFormat::Avi));
        assert_eq!(VideoFormat::from_extension("mkv"), None);
    }

    #[test]
    fn test_guess_mime_type() {
        assert_eq!(guess_mime_type("/tmp/clip.mp4"), "video/mp4");
        assert_eq!(guess_mime_type("holiday.MOV"), "video/quicktime");
        assert_eq!(guess_mime_type("old.avi"), "video/x-msvideo");
        // Unknown and missing extensions fall back to mp4
        assert_eq!(guess_mime_type("/tmp/upload.bin"), DEFAULT_VIDEO_MIME);
        assert_eq!(guess_mime_type("/tmp/upload"), DEFAULT_VIDEO_MIME);
    }

    #[test]
    fn test_uploaded_video_suffix() {
        assert_eq!(UploadedVideo::new("clip.mov", vec![1u8]).suffix(), ".mov");
        assert_eq!(UploadedVideo::new("noext", vec![1u8]).suffix(), ".mp4");
    }

    #[test]
    fn test_accept_attribute() {
        assert_eq!(VideoFormat::accept_attribute(), ".mp4,.mov,.avi");
    }
}
