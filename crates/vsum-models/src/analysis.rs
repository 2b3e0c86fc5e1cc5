//! Query and analysis result models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Filename offered for the downloaded summary.
pub const SUMMARY_FILENAME: &str = "video_summary.txt";

/// Mime type of the downloaded summary.
pub const SUMMARY_MIME: &str = "text/plain";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueryError {
    #[error("Please enter a question or insight to analyze the video.")]
    Empty,
}

/// A non-empty question about a video.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Query(String);

impl Query {
    /// Create a query, rejecting empty input. The text is kept verbatim.
    pub fn new(text: impl Into<String>) -> Result<Self, QueryError> {
        let text = text.into();
        if text.is_empty() {
            return Err(QueryError::Empty);
        }
        Ok(Self(text))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for Query {
    type Error = QueryError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Query> for String {
    fn from(query: Query) -> Self {
        query.0
    }
}

/// The answer produced for one (video, query) pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    /// Markdown answer text, exactly as returned by the model
    pub markdown: String,
    /// Model that produced the answer
    pub model: String,
    /// Number of web searches the model requested
    pub web_searches: u32,
    pub created_at: DateTime<Utc>,
}

impl AnalysisResult {
    pub fn new(markdown: impl Into<String>, model: impl Into<String>, web_searches: u32) -> Self {
        Self {
            markdown: markdown.into(),
            model: model.into(),
            web_searches,
            created_at: Utc::now(),
        }
    }

    /// The plain-text download for this result.
    pub fn download(&self) -> DownloadArtifact {
        DownloadArtifact::summary(self.markdown.clone())
    }
}

/// A file offered to the user for download.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DownloadArtifact {
    pub filename: String,
    pub mime_type: String,
    pub content: String,
}

impl DownloadArtifact {
    /// The `video_summary.txt` artifact holding the given text.
    pub fn summary(content: impl Into<String>) -> Self {
        Self {
            filename: SUMMARY_FILENAME.to_string(),
            mime_type: SUMMARY_MIME.to_string(),
            content: content.into(),
        }
    }

    /// Value for the `Content-Disposition` header.
    pub fn content_disposition(&self) -> String {
        format!("attachment; filename=\"{}\"", self.filename)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_rejects_empty_input() {
        assert_eq!(Query::new(""), Err(QueryError::Empty));
    }

    #[test]
    fn test_whitespace_query_is_accepted() {
        let query = Query::new("   ").unwrap();
        assert_eq!(query.as_str(), "   ");
    }

    #[test]
    fn test_query_keeps_text_verbatim() {
        let query = Query::new("  What is happening?  ").unwrap();
        assert_eq!(query.as_str(), "  What is happening?  ");
    }

    #[test]
    fn test_query_deserialization_validates() {
        assert!(serde_json::from_str::<Query>(r#""""#).is_err());
        let query: Query = serde_json::from_str(r#""Who is speaking?""#).unwrap();
        assert_eq!(query.as_str(), "Who is speaking?");
    }

    #[test]
    fn test_download_matches_result_text() {
        let result = AnalysisResult::new("A cat walks across a table.", "gemini-2.0-flash-exp", 0);
        let download = result.download();
        assert_eq!(download.filename, "video_summary.txt");
        assert_eq!(download.mime_type, "text/plain");
        assert_eq!(download.content, "A cat walks across a table.");
        assert_eq!(
            download.content_disposition(),
            "attachment; filename=\"video_summary.txt\""
        );
    }
}
