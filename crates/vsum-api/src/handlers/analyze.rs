//! Analysis handlers.

use axum::extract::multipart::MultipartError;
use axum::extract::{Multipart, State};
use axum::response::{Html, IntoResponse, Response};
use axum::Json;
use tracing::{error, info};

use vsum_models::{AnalysisResult, UploadedVideo};

use crate::error::{ApiError, ApiResult};
use crate::render::{render_page, Outcome};
use crate::services::AnalysisError;
use crate::state::AppState;

/// Fields of the analyze form.
#[derive(Debug, Default)]
pub struct AnalyzeForm {
    pub video: Option<UploadedVideo>,
    pub query: String,
}

impl AnalyzeForm {
    /// Read the `video` and `query` parts; other parts are ignored.
    pub async fn from_multipart(mut multipart: Multipart) -> Result<Self, MultipartError> {
        let mut form = AnalyzeForm::default();

        while let Some(field) = multipart.next_field().await? {
            let name = field.name().map(str::to_string);
            match name.as_deref() {
                Some("video") => {
                    let filename = field.file_name().unwrap_or_default().to_string();
                    let bytes = field.bytes().await?;
                    // Browsers send an empty part when no file was picked
                    if !filename.is_empty() || !bytes.is_empty() {
                        form.video = Some(UploadedVideo::new(filename, bytes));
                    }
                }
                Some("query") => form.query = field.text().await?,
                _ => {}
            }
        }

        Ok(form)
    }
}

/// Run the pipeline for one form submission and log the outcome.
async fn run_analysis(
    state: &AppState,
    form: AnalyzeForm,
) -> Result<AnalysisResult, AnalysisError> {
    let cancel = state.request_token();
    let result = state.pipeline.run(form.video, &form.query, &cancel).await;

    match &result {
        Ok(result) => info!(
            model = %result.model,
            web_searches = result.web_searches,
            "Analysis succeeded"
        ),
        Err(e) if e.is_user_input() => info!(reason = %e, "Analysis not started"),
        Err(e) => error!(kind = e.kind().as_str(), error = %e, "Analysis failed"),
    }

    result
}

/// POST /analyze
///
/// Renders the outcome as the full page.
pub async fn analyze_page(State(state): State<AppState>, multipart: Multipart) -> Response {
    let form = match AnalyzeForm::from_multipart(multipart).await {
        Ok(form) => form,
        Err(e) => {
            error!(error = %e, "Failed to read analyze form");
            let page = render_page(&Outcome::Failed(e.body_text()), "");
            return (e.status(), Html(page)).into_response();
        }
    };

    let query = form.query.clone();
    let outcome = Outcome::from(run_analysis(&state, form).await);
    Html(render_page(&outcome, &query)).into_response()
}

/// POST /api/analyze
///
/// Same input as the form, JSON output.
pub async fn analyze_json(
    State(state): State<AppState>,
    multipart: Multipart,
) -> ApiResult<Json<AnalysisResult>> {
    let form = AnalyzeForm::from_multipart(multipart).await?;
    let result = run_analysis(&state, form)
        .await
        .map_err(|e| ApiError::from(e).redact_internal(state.config.is_production()))?;
    Ok(Json(result))
}
