//! Video analysis pipeline.
//!
//! One call to [`AnalysisPipeline::run`] handles one user action: store the
//! upload, push it to the model provider, wait for it to become ready, and ask
//! the reasoning agent. The transient file is owned by this function and is
//! removed on every return path.

use std::sync::Arc;
use std::time::Instant;

use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use vsum_gemini::GeminiError;
use vsum_models::{AnalysisResult, Query, QueryError, RequestPhase, UploadedVideo};

use crate::ingest::{IngestError, Ingestor};
use crate::metrics;
use crate::services::{AssetUploader, VideoReasoner};

/// Broad failure category, used for status codes and metric labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    UserInput,
    RemoteProcessing,
    ProcessingTimeout,
    Cancelled,
    ModelInvocation,
    Ingestion,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::UserInput => "user_input",
            ErrorKind::RemoteProcessing => "remote_processing",
            ErrorKind::ProcessingTimeout => "processing_timeout",
            ErrorKind::Cancelled => "cancelled",
            ErrorKind::ModelInvocation => "model_invocation",
            ErrorKind::Ingestion => "ingestion",
        }
    }
}

/// Errors that end an analysis request.
#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("Please upload a video file to begin analysis.")]
    NoVideo,

    #[error("{0}")]
    EmptyQuery(#[from] QueryError),

    #[error("Unsupported file type: {filename}. Please upload an mp4, mov or avi video.")]
    UnsupportedFormat { filename: String },

    #[error("Failed to store uploaded video: {0}")]
    Ingestion(std::io::Error),

    #[error("{0}")]
    RemoteProcessing(GeminiError),

    #[error("{0}")]
    ProcessingTimeout(GeminiError),

    #[error("Analysis was cancelled")]
    Cancelled,

    #[error("{0}")]
    ModelInvocation(GeminiError),
}

impl AnalysisError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            AnalysisError::NoVideo
            | AnalysisError::EmptyQuery(_)
            | AnalysisError::UnsupportedFormat { .. } => ErrorKind::UserInput,
            AnalysisError::Ingestion(_) => ErrorKind::Ingestion,
            AnalysisError::RemoteProcessing(_) => ErrorKind::RemoteProcessing,
            AnalysisError::ProcessingTimeout(_) => ErrorKind::ProcessingTimeout,
            AnalysisError::Cancelled => ErrorKind::Cancelled,
            AnalysisError::ModelInvocation(_) => ErrorKind::ModelInvocation,
        }
    }

    pub fn is_user_input(&self) -> bool {
        self.kind() == ErrorKind::UserInput
    }

    /// Classify an uploader failure.
    fn from_upload(err: GeminiError) -> Self {
        match err {
            GeminiError::ProcessingTimeout { .. } => AnalysisError::ProcessingTimeout(err),
            GeminiError::Cancelled => AnalysisError::Cancelled,
            other => AnalysisError::RemoteProcessing(other),
        }
    }

    /// Classify a reasoning failure. Every agent error is a model invocation error.
    fn from_model(err: GeminiError) -> Self {
        match err {
            GeminiError::Cancelled => AnalysisError::Cancelled,
            other => AnalysisError::ModelInvocation(other),
        }
    }
}

impl From<IngestError> for AnalysisError {
    fn from(err: IngestError) -> Self {
        match err {
            IngestError::UnsupportedFormat { filename } => {
                AnalysisError::UnsupportedFormat { filename }
            }
            IngestError::Io(e) => AnalysisError::Ingestion(e),
        }
    }
}

/// Upload, wait, ask.
#[derive(Clone)]
pub struct AnalysisPipeline {
    ingestor: Ingestor,
    uploader: Arc<dyn AssetUploader>,
    reasoner: Arc<dyn VideoReasoner>,
}

impl AnalysisPipeline {
    pub fn new(
        ingestor: Ingestor,
        uploader: Arc<dyn AssetUploader>,
        reasoner: Arc<dyn VideoReasoner>,
    ) -> Self {
        Self {
            ingestor,
            uploader,
            reasoner,
        }
    }

    /// Run one analysis.
    ///
    /// No remote call is made unless a supported video and a non-blank query
    /// are both present. The stored upload is removed before this returns.
    pub async fn run(
        &self,
        video: Option<UploadedVideo>,
        query: &str,
        cancel: &CancellationToken,
    ) -> Result<AnalysisResult, AnalysisError> {
        let result = self.execute(video, query, cancel).await;
        match &result {
            Ok(_) => metrics::record_analysis("done"),
            Err(e) => metrics::record_analysis(e.kind().as_str()),
        }
        result
    }

    async fn execute(
        &self,
        video: Option<UploadedVideo>,
        query: &str,
        cancel: &CancellationToken,
    ) -> Result<AnalysisResult, AnalysisError> {
        let mut phase = RequestPhase::Idle;

        let video = video.ok_or(AnalysisError::NoVideo)?;
        let transient = self.ingestor.ingest(&video).await?;
        metrics::record_upload_bytes(video.bytes.len());
        advance(&mut phase, RequestPhase::AwaitingQuery);

        let query = Query::new(query)?;
        advance(&mut phase, RequestPhase::Processing);

        info!(
            filename = %video.filename,
            bytes = video.bytes.len(),
            mime_type = transient.mime_type(),
            "Submitting video for analysis"
        );

        let started = Instant::now();
        let asset = self
            .uploader
            .submit(transient.path(), transient.mime_type(), cancel)
            .await
            .map_err(AnalysisError::from_upload)?;
        metrics::record_upload_duration(started.elapsed().as_secs_f64());

        if !asset.is_ready() {
            warn!(
                asset = %asset.id,
                state = %asset.state,
                "Asset is not ready, skipping model call"
            );
            return Err(AnalysisError::RemoteProcessing(GeminiError::AssetFailed {
                name: asset.id.to_string(),
                reason: format!("asset is {}", asset.state),
            }));
        }

        let started = Instant::now();
        let answer = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(AnalysisError::Cancelled),
            answer = self.reasoner.answer(&query, &asset) => {
                answer.map_err(AnalysisError::from_model)?
            }
        };
        metrics::record_model_duration(&answer.model, started.elapsed().as_secs_f64());
        metrics::record_web_searches(answer.web_searches);
        advance(&mut phase, RequestPhase::Done);

        info!(
            asset = %asset.id,
            model = %answer.model,
            web_searches = answer.web_searches,
            chars = answer.text.len(),
            "Analysis complete"
        );

        drop(transient);
        Ok(AnalysisResult::new(answer.text, answer.model, answer.web_searches))
    }
}

fn advance(phase: &mut RequestPhase, next: RequestPhase) {
    debug_assert!(phase.can_transition_to(next), "{phase} -> {next}");
    debug!(from = %phase, to = %next, "Request phase");
    *phase = next;
}
