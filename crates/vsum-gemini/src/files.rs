//! Gemini Files API client.
//!
//! Videos are uploaded with the resumable protocol and then polled at a fixed
//! interval until the service reports them ready or failed.

use std::path::Path;

use reqwest::{Client, Response};
use serde_json::json;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use vsum_models::{AssetId, AssetState, RemoteAsset};

use crate::config::GeminiConfig;
use crate::error::{GeminiError, GeminiResult};
use crate::types::{extract_error_message, FileEnvelope, FileResource};

const UPLOAD_URL_HEADER: &str = "x-goog-upload-url";

/// Client for uploading videos and tracking their processing state.
#[derive(Clone)]
pub struct GeminiFilesClient {
    config: GeminiConfig,
    client: Client,
}

impl GeminiFilesClient {
    /// Create a new Files client.
    pub fn new(config: GeminiConfig) -> GeminiResult<Self> {
        let client = Client::builder().timeout(config.request_timeout).build()?;
        Ok(Self { config, client })
    }

    /// Upload a video and wait until it is ready for analysis.
    ///
    /// Fails with [`GeminiError::AssetFailed`] when the service rejects the
    /// video, [`GeminiError::ProcessingTimeout`] when the attempt budget runs
    /// out and [`GeminiError::Cancelled`] when `cancel` fires first.
    pub async fn submit(
        &self,
        path: &Path,
        mime_type: &str,
        cancel: &CancellationToken,
    ) -> GeminiResult<RemoteAsset> {
        let asset = tokio::select! {
            _ = cancel.cancelled() => return Err(GeminiError::Cancelled),
            uploaded = self.upload(path, mime_type) => uploaded?,
        };
        self.wait_until_ready(asset, cancel).await
    }

    /// Upload a file with the resumable protocol (start, then upload+finalize).
    pub async fn upload(&self, path: &Path, mime_type: &str) -> GeminiResult<RemoteAsset> {
        let api_key = self.config.api_key()?;
        let bytes = tokio::fs::read(path).await?;
        let display_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("video")
            .to_string();

        debug!(
            path = %path.display(),
            size = bytes.len(),
            mime_type,
            "Starting Gemini upload session"
        );

        let start = self
            .client
            .post(format!("{}/upload/v1beta/files", self.config.base_url))
            .header("x-goog-api-key", api_key)
            .header("X-Goog-Upload-Protocol", "resumable")
            .header("X-Goog-Upload-Command", "start")
            .header("X-Goog-Upload-Header-Content-Length", bytes.len().to_string())
            .header("X-Goog-Upload-Header-Content-Type", mime_type)
            .json(&json!({ "file": { "display_name": display_name } }))
            .send()
            .await?;
        let start = check_status(start).await?;

        let upload_url = start
            .headers()
            .get(UPLOAD_URL_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
            .ok_or(GeminiError::MissingUploadUrl)?;

        let size = bytes.len();
        let response = self
            .client
            .post(&upload_url)
            .header("X-Goog-Upload-Offset", "0")
            .header("X-Goog-Upload-Command", "upload, finalize")
            .body(bytes)
            .send()
            .await?;
        let response = check_status(response).await?;

        let envelope: FileEnvelope = response
            .json()
            .await
            .map_err(|e| GeminiError::decode(format!("upload response: {}", e)))?;
        let asset = envelope.file.into_asset(mime_type);

        info!(
            asset = %asset.id,
            size,
            state = %asset.state,
            "Uploaded video to Gemini"
        );
        Ok(asset)
    }

    /// Fetch the current state of an uploaded file.
    ///
    /// `fallback_mime` is used when the service omits the mime type.
    pub async fn get_file(&self, id: &AssetId, fallback_mime: &str) -> GeminiResult<RemoteAsset> {
        let api_key = self.config.api_key()?;
        let response = self
            .client
            .get(format!("{}/v1beta/{}", self.config.base_url, id))
            .header("x-goog-api-key", api_key)
            .send()
            .await?;
        let response = check_status(response).await?;

        let file: FileResource = response
            .json()
            .await
            .map_err(|e| GeminiError::decode(format!("file status: {}", e)))?;
        Ok(file.into_asset(fallback_mime))
    }

    /// Re-check the file at a fixed interval while it is processing.
    pub async fn wait_until_ready(
        &self,
        mut asset: RemoteAsset,
        cancel: &CancellationToken,
    ) -> GeminiResult<RemoteAsset> {
        let mut attempts = 0u32;

        loop {
            match &asset.state {
                AssetState::Ready => {
                    debug!(asset = %asset.id, attempts, "Asset ready");
                    return Ok(asset);
                }
                AssetState::Failed { reason } => {
                    warn!(asset = %asset.id, reason = reason.as_str(), "Asset processing failed");
                    return Err(GeminiError::AssetFailed {
                        name: asset.id.to_string(),
                        reason: reason.clone(),
                    });
                }
                AssetState::Processing => {}
            }

            if attempts >= self.config.max_poll_attempts {
                warn!(asset = %asset.id, attempts, "Gave up waiting for asset");
                return Err(GeminiError::ProcessingTimeout {
                    name: asset.id.to_string(),
                    attempts,
                });
            }

            let polled = tokio::select! {
                _ = cancel.cancelled() => {
                    info!(asset = %asset.id, attempts, "Polling cancelled");
                    return Err(GeminiError::Cancelled);
                }
                polled = async {
                    tokio::time::sleep(self.config.poll_interval).await;
                    self.get_file(&asset.id, &asset.mime_type).await
                } => polled,
            };

            attempts += 1;
            asset = polled?;
            debug!(asset = %asset.id, attempts, state = %asset.state, "Polled asset state");
        }
    }
}

/// Turn a non-success response into [`GeminiError::Api`].
pub(crate) async fn check_status(response: Response) -> GeminiResult<Response> {
    if response.status().is_success() {
        return Ok(response);
    }
    let status = response.status();
    let error_text = response.text().await.unwrap_or_default();
    Err(GeminiError::api(status.as_u16(), extract_error_message(&error_text)))
}
