//! Reasoning agent: one question about one video, with optional web search.
//!
//! The agent sends the video reference and the analysis prompt to Gemini with
//! the search function declared. Whenever the model asks for a search, the
//! agent runs it, feeds the results back and asks again. The number of tool
//! rounds is bounded; the last permitted call disables function calling so the
//! model has to produce text.

use std::sync::Arc;
use std::time::Instant;

use reqwest::Client;
use tracing::{debug, info};
use vsum_models::{Query, RemoteAsset};

use crate::config::GeminiConfig;
use crate::error::{GeminiError, GeminiResult};
use crate::files::check_status;
use crate::prompt::{build_analysis_prompt, system_instruction};
use crate::search::{run_search_call, search_declaration, WebSearch, SEARCH_FUNCTION};
use crate::types::{
    Candidate, Content, GenerateContentRequest, GenerateContentResponse, Part, Tool, ToolConfig,
};

/// Final answer from the agent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentAnswer {
    /// Markdown answer text
    pub text: String,
    pub model: String,
    /// Number of search calls executed while answering
    pub web_searches: u32,
}

/// Gemini-backed agent with a single web search tool.
#[derive(Clone)]
pub struct GeminiAgent {
    config: GeminiConfig,
    client: Client,
    search: Arc<dyn WebSearch>,
}

impl GeminiAgent {
    /// Create a new agent.
    pub fn new(config: GeminiConfig, search: Arc<dyn WebSearch>) -> GeminiResult<Self> {
        let client = Client::builder().timeout(config.request_timeout).build()?;
        Ok(Self {
            config,
            client,
            search,
        })
    }

    /// Answer `query` about the (ready) `asset`.
    pub async fn answer(&self, query: &Query, asset: &RemoteAsset) -> GeminiResult<AgentAnswer> {
        let started = Instant::now();
        let mut contents = vec![Content::user(vec![
            Part::file(asset),
            Part::text(build_analysis_prompt(query)),
        ])];
        let mut web_searches = 0u32;
        let max_rounds = self.config.max_tool_rounds;

        for round in 0..=max_rounds {
            let tools_allowed = round < max_rounds;
            let request = GenerateContentRequest {
                system_instruction: Some(Content::instruction(system_instruction())),
                contents: contents.clone(),
                tools: vec![Tool {
                    function_declarations: vec![search_declaration()],
                }],
                tool_config: (!tools_allowed).then(ToolConfig::disabled),
            };

            let candidate = self.generate(&request).await?;
            let calls = candidate.function_calls();

            if calls.is_empty() || !tools_allowed {
                let text = candidate.text();
                if text.trim().is_empty() {
                    return Err(match candidate.finish_reason.as_deref() {
                        Some(reason @ ("SAFETY" | "PROHIBITED_CONTENT" | "BLOCKLIST")) => {
                            GeminiError::Blocked(reason.to_string())
                        }
                        _ => GeminiError::EmptyResponse,
                    });
                }

                info!(
                    asset = %asset.id,
                    model = self.config.model.as_str(),
                    web_searches,
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "Agent produced answer"
                );
                return Ok(AgentAnswer {
                    text,
                    model: self.config.model.clone(),
                    web_searches,
                });
            }

            // Echo the model turn unchanged, then answer each call in order
            if let Some(content) = candidate.content {
                contents.push(content);
            }
            let mut responses = Vec::with_capacity(calls.len());
            for call in calls {
                debug!(round, function = call.name.as_str(), "Model requested tool call");
                let payload = if call.name == SEARCH_FUNCTION {
                    web_searches += 1;
                    run_search_call(self.search.as_ref(), &call.args).await
                } else {
                    serde_json::json!({ "error": format!("unknown function: {}", call.name) })
                };
                responses.push(Part::function_response(call.name, payload));
            }
            contents.push(Content::user(responses));
        }

        Err(GeminiError::EmptyResponse)
    }

    /// Call generateContent and return the first candidate.
    async fn generate(&self, request: &GenerateContentRequest) -> GeminiResult<Candidate> {
        let api_key = self.config.api_key()?;
        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.config.base_url, self.config.model
        );

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", api_key)
            .json(request)
            .send()
            .await?;
        let response = check_status(response).await?;

        let body: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| GeminiError::decode(format!("Gemini response: {}", e)))?;

        match body.candidates.into_iter().next() {
            Some(candidate) => Ok(candidate),
            None => Err(body
                .prompt_feedback
                .and_then(|f| f.block_reason)
                .map(GeminiError::Blocked)
                .unwrap_or(GeminiError::EmptyResponse)),
        }
    }
}
