//! Gemini client for video question answering.
//!
//! This crate provides:
//! - Video upload through the Gemini Files API (resumable protocol)
//! - Bounded, cancellable polling until an uploaded file is ready
//! - A reasoning agent that answers a question about a video and may call
//!   a web search function while composing its answer
//! - A DuckDuckGo search backend for that function

pub mod agent;
pub mod config;
pub mod error;
pub mod files;
pub mod prompt;
pub mod search;
pub mod types;

pub use agent::{AgentAnswer, GeminiAgent};
pub use config::{GeminiConfig, SearchConfig};
pub use error::{GeminiError, GeminiResult};
pub use files::GeminiFilesClient;
pub use search::{DuckDuckGoSearch, SearchHit, WebSearch};
