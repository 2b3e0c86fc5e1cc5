//! Business services.
//!
//! The remote collaborators sit behind small traits so the pipeline can be
//! exercised without network access.

pub mod analysis;

use std::path::Path;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use vsum_gemini::{AgentAnswer, GeminiAgent, GeminiFilesClient, GeminiResult};
use vsum_models::{Query, RemoteAsset};

pub use analysis::{AnalysisError, AnalysisPipeline, ErrorKind};

/// Pushes a local video to the model provider and waits until it is usable.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AssetUploader: Send + Sync {
    async fn submit(
        &self,
        path: &Path,
        mime_type: &str,
        cancel: &CancellationToken,
    ) -> GeminiResult<RemoteAsset>;
}

/// Answers a question about a ready remote asset.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait VideoReasoner: Send + Sync {
    async fn answer(&self, query: &Query, asset: &RemoteAsset) -> GeminiResult<AgentAnswer>;
}

#[async_trait]
impl AssetUploader for GeminiFilesClient {
    async fn submit(
        &self,
        path: &Path,
        mime_type: &str,
        cancel: &CancellationToken,
    ) -> GeminiResult<RemoteAsset> {
        GeminiFilesClient::submit(self, path, mime_type, cancel).await
    }
}

#[async_trait]
impl VideoReasoner for GeminiAgent {
    async fn answer(&self, query: &Query, asset: &RemoteAsset) -> GeminiResult<AgentAnswer> {
        GeminiAgent::answer(self, query, asset).await
    }
}
