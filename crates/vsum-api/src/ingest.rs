//! Transient storage for uploaded videos.
//!
//! An upload lives on disk only for the duration of one analysis request.
//! [`TransientVideo`] owns the file and removes it when dropped, so every exit
//! path of the request (including a dropped future) cleans up after itself.

use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use thiserror::Error;
use tracing::debug;

use vsum_models::{guess_mime_type, UploadedVideo};

const FILE_PREFIX: &str = "vsum-upload-";

/// Errors from writing an upload to disk.
#[derive(Debug, Error)]
pub enum IngestError {
    #[error("Unsupported file type: {filename}. Please upload an mp4, mov or avi video.")]
    UnsupportedFormat { filename: String },

    #[error("Failed to store uploaded video: {0}")]
    Io(#[from] std::io::Error),
}

/// An uploaded video written to a uniquely named file.
///
/// The file is deleted on drop. Removal errors are ignored.
#[derive(Debug)]
pub struct TransientVideo {
    file: NamedTempFile,
    mime_type: &'static str,
}

impl TransientVideo {
    pub fn path(&self) -> &Path {
        self.file.path()
    }

    pub fn mime_type(&self) -> &'static str {
        self.mime_type
    }
}

/// Writes uploads into the configured upload directory.
#[derive(Debug, Clone)]
pub struct Ingestor {
    upload_dir: PathBuf,
}

impl Ingestor {
    pub fn new(upload_dir: impl Into<PathBuf>) -> Self {
        Self {
            upload_dir: upload_dir.into(),
        }
    }

    /// Persist `video` and return the guard owning the file.
    ///
    /// Only mp4, mov and avi uploads are accepted; anything else is rejected
    /// before touching the filesystem.
    pub async fn ingest(&self, video: &UploadedVideo) -> Result<TransientVideo, IngestError> {
        if video.format().is_none() {
            return Err(IngestError::UnsupportedFormat {
                filename: video.filename.clone(),
            });
        }

        let dir = self.upload_dir.clone();
        let suffix = video.suffix();
        let bytes = video.bytes.clone();

        let file = tokio::task::spawn_blocking(move || -> std::io::Result<NamedTempFile> {
            let mut file = tempfile::Builder::new()
                .prefix(FILE_PREFIX)
                .suffix(&suffix)
                .tempfile_in(&dir)?;
            file.write_all(&bytes)?;
            file.flush()?;
            Ok(file)
        })
        .await
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))??;

        let mime_type = guess_mime_type(file.path());
        debug!(
            path = %file.path().display(),
            bytes = video.bytes.len(),
            mime_type,
            "Stored uploaded video"
        );

        Ok(TransientVideo { file, mime_type })
    }
}
