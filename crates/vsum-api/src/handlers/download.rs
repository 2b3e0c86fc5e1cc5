//! Summary download.

use axum::http::header;
use axum::response::IntoResponse;
use axum::Form;
use serde::Deserialize;

use vsum_models::DownloadArtifact;

#[derive(Debug, Deserialize)]
pub struct DownloadForm {
    pub content: String,
}

/// POST /download
///
/// Echoes the analysis text back as `video_summary.txt`.
pub async fn download_summary(Form(form): Form<DownloadForm>) -> impl IntoResponse {
    // Form submission turns newlines into CRLF; undo it so the file matches the page
    let artifact = DownloadArtifact::summary(form.content.replace("\r\n", "\n"));

    (
        [
            (header::CONTENT_TYPE, artifact.mime_type.clone()),
            (header::CONTENT_DISPOSITION, artifact.content_disposition()),
        ],
        artifact.content,
    )
}
