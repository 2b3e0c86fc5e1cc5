//! Client configuration.

use std::fmt;
use std::time::Duration;

use crate::error::{GeminiError, GeminiResult};

/// Configuration shared by the Files client and the agent.
///
/// Built once at process start and handed to each client; nothing in this
/// crate reads the environment on its own.
#[derive(Clone)]
pub struct GeminiConfig {
    /// API key for the Gemini API (optional at startup, required per call)
    pub api_key: Option<String>,
    /// API base URL, without a trailing slash
    pub base_url: String,
    /// Model used to answer questions
    pub model: String,
    /// Delay between file status checks
    pub poll_interval: Duration,
    /// Maximum number of file status checks before giving up
    pub max_poll_attempts: u32,
    /// Maximum number of model turns that may execute tool calls
    pub max_tool_rounds: u32,
    /// Timeout for a single HTTP request
    pub request_timeout: Duration,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: "https://generativelanguage.googleapis.com".to_string(),
            model: "gemini-2.0-flash-exp".to_string(),
            poll_interval: Duration::from_secs(1),
            max_poll_attempts: 600,
            max_tool_rounds: 5,
            request_timeout: Duration::from_secs(300),
        }
    }
}

impl GeminiConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            api_key: std::env::var("GOOGLE_API_KEY")
                .or_else(|_| std::env::var("GEMINI_API_KEY"))
                .ok()
                .filter(|key| !key.trim().is_empty()),
            base_url: std::env::var("GEMINI_BASE_URL")
                .map(|url| url.trim_end_matches('/').to_string())
                .unwrap_or(defaults.base_url),
            model: std::env::var("GEMINI_MODEL").unwrap_or(defaults.model),
            poll_interval: std::env::var("GEMINI_POLL_INTERVAL_MS")
                .ok()
                .and_then(|s| s.parse().ok())
                .map(Duration::from_millis)
                .unwrap_or(defaults.poll_interval),
            max_poll_attempts: std::env::var("GEMINI_POLL_MAX_ATTEMPTS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.max_poll_attempts),
            max_tool_rounds: std::env::var("GEMINI_MAX_TOOL_ROUNDS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.max_tool_rounds),
            request_timeout: std::env::var("GEMINI_REQUEST_TIMEOUT_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .map(Duration::from_secs)
                .unwrap_or(defaults.request_timeout),
        }
    }

    /// The configured API key, or an error if none was provided.
    pub fn api_key(&self) -> GeminiResult<&str> {
        self.api_key.as_deref().ok_or(GeminiError::MissingApiKey)
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }
}

impl fmt::Debug for GeminiConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeminiConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("poll_interval", &self.poll_interval)
            .field("max_poll_attempts", &self.max_poll_attempts)
            .field("max_tool_rounds", &self.max_tool_rounds)
            .field("request_timeout", &self.request_timeout)
            .finish()
    }
}

/// Configuration for the web search backend.
#[derive(Debug, Clone)]
pub struct SearchConfig {
    /// DuckDuckGo HTML endpoint base URL
    pub base_url: String,
    /// Results returned when the model does not ask for a count
    pub max_results: usize,
    pub request_timeout: Duration,
    /// Sent with every search; the HTML endpoint rejects empty agents
    pub user_agent: String,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            base_url: "https://html.duckduckgo.com".to_string(),
            max_results: 5,
            request_timeout: Duration::from_secs(15),
            user_agent: concat!("vsum/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl SearchConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            base_url: std::env::var("DUCKDUCKGO_BASE_URL")
                .map(|url| url.trim_end_matches('/').to_string())
                .unwrap_or(defaults.base_url),
            max_results: std::env::var("SEARCH_MAX_RESULTS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.max_results),
            request_timeout: defaults.request_timeout,
            user_agent: std::env::var("SEARCH_USER_AGENT").unwrap_or(defaults.user_agent),
        }
    }
}
