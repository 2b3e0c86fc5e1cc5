//! API error types.

use axum::extract::multipart::MultipartError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;

use crate::services::{AnalysisError, ErrorKind};

pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Upstream error: {0}")]
    Upstream(String),

    #[error("Timed out: {0}")]
    Timeout(String),

    #[error("Service unavailable: {0}")]
    Unavailable(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ApiError {
    /// Drop internal error details when running in production.
    pub fn redact_internal(self, production: bool) -> Self {
        match self {
            ApiError::Internal(_) if production => {
                ApiError::Internal("An internal error occurred".to_string())
            }
            other => other,
        }
    }

    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Upstream(_) => StatusCode::BAD_GATEWAY,
            ApiError::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
            ApiError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn code(&self) -> &'static str {
        match self {
            ApiError::BadRequest(_) => "bad_request",
            ApiError::Upstream(_) => "upstream_error",
            ApiError::Timeout(_) => "timeout",
            ApiError::Unavailable(_) => "unavailable",
            ApiError::Internal(_) => "internal_error",
        }
    }
}

impl From<AnalysisError> for ApiError {
    fn from(err: AnalysisError) -> Self {
        let msg = err.to_string();
        match err.kind() {
            ErrorKind::UserInput => ApiError::BadRequest(msg),
            ErrorKind::RemoteProcessing | ErrorKind::ModelInvocation => ApiError::Upstream(msg),
            ErrorKind::ProcessingTimeout => ApiError::Timeout(msg),
            ErrorKind::Cancelled => ApiError::Unavailable(msg),
            ErrorKind::Ingestion => ApiError::Internal(msg),
        }
    }
}

impl From<MultipartError> for ApiError {
    fn from(err: MultipartError) -> Self {
        ApiError::BadRequest(err.body_text())
    }
}

#[derive(Serialize)]
struct ErrorResponse {
    detail: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    code: Option<String>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = ErrorResponse {
            detail: self.to_string(),
            code: Some(self.code().to_string()),
        };

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vsum_gemini::GeminiError;
    use vsum_models::QueryError;

    #[test]
    fn test_analysis_errors_map_to_status_codes() {
        let cases = [
            (AnalysisError::EmptyQuery(QueryError::Empty), StatusCode::BAD_REQUEST),
            (AnalysisError::NoVideo, StatusCode::BAD_REQUEST),
            (
                AnalysisError::RemoteProcessing(GeminiError::MissingApiKey),
                StatusCode::BAD_GATEWAY,
            ),
            (
                AnalysisError::ModelInvocation(GeminiError::EmptyResponse),
                StatusCode::BAD_GATEWAY,
            ),
            (
                AnalysisError::ProcessingTimeout(GeminiError::ProcessingTimeout {
                    name: "files/abc".to_string(),
                    attempts: 3,
                }),
                StatusCode::GATEWAY_TIMEOUT,
            ),
            (AnalysisError::Cancelled, StatusCode::SERVICE_UNAVAILABLE),
        ];

        for (err, status) in cases {
            assert_eq!(ApiError::from(err).status_code(), status);
        }
    }

    #[test]
    fn test_internal_details_hidden_in_production() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "/srv/uploads denied");
        let err = ApiError::from(AnalysisError::Ingestion(io));
        assert!(err.to_string().contains("/srv/uploads denied"));

        let redacted = err.redact_internal(true);
        assert_eq!(redacted.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(redacted.to_string(), "Internal error: An internal error occurred");
    }

    #[test]
    fn test_redaction_keeps_other_errors_and_dev_details() {
        let bad = ApiError::from(AnalysisError::NoVideo).redact_internal(true);
        assert!(matches!(bad, ApiError::BadRequest(_)));

        let internal = ApiError::Internal("disk full".to_string()).redact_internal(false);
        assert_eq!(internal.to_string(), "Internal error: disk full");
    }

    #[test]
    fn test_user_input_message_is_kept() {
        let err = ApiError::from(AnalysisError::EmptyQuery(QueryError::Empty));
        assert_eq!(
            err.to_string(),
            "Bad request: Please enter a question or insight to analyze the video."
        );
    }
}
