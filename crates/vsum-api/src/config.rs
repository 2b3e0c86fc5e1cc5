//! API configuration.

use std::path::PathBuf;

use vsum_gemini::{GeminiConfig, SearchConfig};

/// API server configuration.
///
/// Loaded once at startup; the Gemini and search sections are handed to the
/// remote clients as-is.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Server host
    pub host: String,
    /// Server port
    pub port: u16,
    /// Max upload size in bytes
    pub max_upload_size: usize,
    /// Directory for transient video files
    pub upload_dir: PathBuf,
    /// Environment (development/production)
    pub environment: String,
    /// Remote model settings
    pub gemini: GeminiConfig,
    /// Web search settings
    pub search: SearchConfig,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8501,
            max_upload_size: 200 * 1024 * 1024, // 200MB
            upload_dir: std::env::temp_dir(),
            environment: "development".to_string(),
            gemini: GeminiConfig::default(),
            search: SearchConfig::default(),
        }
    }
}

impl ApiConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        Self {
            host: std::env::var("API_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: std::env::var("API_PORT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(8501),
            max_upload_size: std::env::var("MAX_UPLOAD_SIZE")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(200 * 1024 * 1024),
            upload_dir: std::env::var("UPLOAD_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| std::env::temp_dir()),
            environment: std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string()),
            gemini: GeminiConfig::from_env(),
            search: SearchConfig::from_env(),
        }
    }

    /// Check if running in production mode.
    pub fn is_production(&self) -> bool {
        self.environment.to_lowercase() == "production"
    }
}
