//! Gemini client error types.

use thiserror::Error;

/// Result type for Gemini operations.
pub type GeminiResult<T> = Result<T, GeminiError>;

/// Errors that can occur while talking to Gemini or the search backend.
#[derive(Debug, Error)]
pub enum GeminiError {
    #[error("GOOGLE_API_KEY is not configured")]
    MissingApiKey,

    #[error("Request failed: {0}")]
    Request(reqwest::Error),

    #[error("Gemini API returned {status}: {message}")]
    Api { status: u16, message: String },

    #[error("Upload session did not return an upload URL")]
    MissingUploadUrl,

    #[error("Remote processing of {name} failed: {reason}")]
    AssetFailed { name: String, reason: String },

    #[error("{name} was still processing after {attempts} status checks")]
    ProcessingTimeout { name: String, attempts: u32 },

    #[error("Operation cancelled")]
    Cancelled,

    #[error("No content in Gemini response")]
    EmptyResponse,

    #[error("Gemini blocked the request: {0}")]
    Blocked(String),

    #[error("Failed to parse response: {0}")]
    Decode(String),

    #[error("Web search failed: {0}")]
    Search(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<reqwest::Error> for GeminiError {
    fn from(e: reqwest::Error) -> Self {
        // URLs may carry credentials; keep them out of user-facing messages
        Self::Request(e.without_url())
    }
}

impl GeminiError {
    pub fn api(status: u16, message: impl Into<String>) -> Self {
        Self::Api {
            status,
            message: message.into(),
        }
    }

    pub fn decode(msg: impl Into<String>) -> Self {
        Self::Decode(msg.into())
    }

    pub fn search(msg: impl Into<String>) -> Self {
        Self::Search(msg.into())
    }
}
