//! Shared data models for the video summarizer.
//!
//! This crate provides Serde-serializable types for:
//! - Uploaded videos and their container formats
//! - Remote assets and their processing lifecycle
//! - User queries and analysis results
//! - The per-request state machine

pub mod analysis;
pub mod asset;
pub mod request;
pub mod video;

// Re-export common types
pub use analysis::{
    AnalysisResult, DownloadArtifact, Query, QueryError, SUMMARY_FILENAME, SUMMARY_MIME,
};
pub use asset::{AssetId, AssetState, RemoteAsset};
pub use request::RequestPhase;
pub use video::{guess_mime_type, UploadedVideo, VideoFormat, DEFAULT_VIDEO_MIME};
