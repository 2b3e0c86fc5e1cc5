//! Prompt construction for video analysis.

use vsum_models::Query;

/// Name the agent introduces itself with.
pub const AGENT_NAME: &str = "Video Summarizer Agent";

/// System instruction sent with every analysis request.
pub fn system_instruction() -> String {
    format!(
        "You are {AGENT_NAME}. You answer questions about the video attached to the \
         user's message. When the video alone does not answer the question, call the \
         duckduckgo_search function to look up supporting information on the web. \
         Use markdown to format your answers."
    )
}

/// Combine the user's question with the fixed analysis directive.
pub fn build_analysis_prompt(query: &Query) -> String {
    format!(
        "Analyze the uploaded video for content and context.\n\
         Respond to the following query using video insights and supplementary web research:\n\
         {}\n\
         \n\
         Provide a detailed, user-friendly, and actionable response.",
        query.as_str()
    )
}
