//! Axum server for the video summarizer.
//!
//! This crate provides:
//! - The upload/query page and its download endpoint
//! - A JSON analysis endpoint for programmatic clients
//! - The analysis pipeline tying ingestion, Gemini and web search together
//! - Prometheus metrics and health probes

pub mod config;
pub mod error;
pub mod handlers;
pub mod ingest;
pub mod metrics;
pub mod middleware;
pub mod render;
pub mod routes;
pub mod services;
pub mod state;

pub use config::ApiConfig;
pub use error::{ApiError, ApiResult};
pub use routes::create_router;
pub use services::{AnalysisError, AnalysisPipeline, AssetUploader, ErrorKind, VideoReasoner};
pub use state::AppState;
