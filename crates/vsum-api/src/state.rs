//! Application state.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::warn;

use vsum_gemini::{DuckDuckGoSearch, GeminiAgent, GeminiFilesClient, GeminiResult};

use crate::config::ApiConfig;
use crate::ingest::Ingestor;
use crate::services::{AnalysisPipeline, AssetUploader, VideoReasoner};

/// Shared application state.
///
/// Holds only immutable configuration, shared clients and the shutdown token.
#[derive(Clone)]
pub struct AppState {
    pub config: ApiConfig,
    pub pipeline: Arc<AnalysisPipeline>,
    /// Cancelled on server shutdown; requests work on child tokens
    pub shutdown: CancellationToken,
}

impl AppState {
    /// Create new application state backed by Gemini and DuckDuckGo.
    pub fn new(config: ApiConfig) -> GeminiResult<Self> {
        if !config.gemini.has_api_key() {
            warn!("GOOGLE_API_KEY is not set; analysis requests will fail until it is configured");
        }

        let search = Arc::new(DuckDuckGoSearch::new(config.search.clone())?);
        let uploader = Arc::new(GeminiFilesClient::new(config.gemini.clone())?);
        let reasoner = Arc::new(GeminiAgent::new(config.gemini.clone(), search)?);

        Ok(Self::with_services(config, uploader, reasoner))
    }

    /// Create state around arbitrary uploader and reasoner implementations.
    pub fn with_services(
        config: ApiConfig,
        uploader: Arc<dyn AssetUploader>,
        reasoner: Arc<dyn VideoReasoner>,
    ) -> Self {
        let ingestor = Ingestor::new(config.upload_dir.clone());
        Self {
            pipeline: Arc::new(AnalysisPipeline::new(ingestor, uploader, reasoner)),
            config,
            shutdown: CancellationToken::new(),
        }
    }

    /// Token for one request, cancelled together with the server.
    pub fn request_token(&self) -> CancellationToken {
        self.shutdown.child_token()
    }
}
