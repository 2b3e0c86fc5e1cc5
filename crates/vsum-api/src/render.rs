//! Server-rendered HTML page.
//!
//! The whole UI is one page: the upload form on top and a single banner or
//! result section below it, depending on the [`Outcome`] of the request.

use pulldown_cmark::{html, CowStr, Event, Options, Parser, Tag};
use vsum_models::{AnalysisResult, RequestPhase, VideoFormat};

use crate::services::AnalysisError;

pub const INFO_NO_VIDEO: &str = "Please upload a video file to begin analysis.";
pub const RESULT_HEADING: &str = "AI Analysis Result";
pub const SPINNER_TEXT: &str = "Processing video and gathering insights...";
const QUERY_PLACEHOLDER: &str = "Ask anything about the video content. The AI Agent will \
                                 analyze and gather additional contextual information if needed.";

/// What the page shows below the form.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// No video yet: informational banner only
    AwaitingVideo,
    /// User input problem: warning banner, nothing was sent anywhere
    Warning(String),
    Done(AnalysisResult),
    /// Analysis failed: error banner with the underlying description
    Failed(String),
}

impl Outcome {
    pub fn phase(&self) -> RequestPhase {
        match self {
            Outcome::AwaitingVideo => RequestPhase::Idle,
            Outcome::Warning(_) => RequestPhase::AwaitingQuery,
            Outcome::Done(_) => RequestPhase::Done,
            Outcome::Failed(_) => RequestPhase::Failed,
        }
    }
}

impl From<Result<AnalysisResult, AnalysisError>> for Outcome {
    fn from(result: Result<AnalysisResult, AnalysisError>) -> Self {
        match result {
            Ok(result) => Outcome::Done(result),
            Err(AnalysisError::NoVideo) => Outcome::AwaitingVideo,
            Err(e) if e.is_user_input() => Outcome::Warning(e.to_string()),
            Err(e) => Outcome::Failed(e.to_string()),
        }
    }
}

/// Escape text for use in HTML element content and quoted attributes.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn is_script_url(url: &str) -> bool {
    url.trim_start()
        .get(..11)
        .is_some_and(|scheme| scheme.eq_ignore_ascii_case("javascript:"))
}

/// Render model markdown to HTML.
///
/// Raw HTML in the answer is shown as text and `javascript:` links are
/// neutralised; everything else follows CommonMark plus tables.
pub fn render_markdown(markdown: &str) -> String {
    let options =
        Options::ENABLE_TABLES | Options::ENABLE_STRIKETHROUGH | Options::ENABLE_TASKLISTS;
    let events = Parser::new_ext(markdown, options).map(|event| match event {
        Event::Html(raw) | Event::InlineHtml(raw) => Event::Text(raw),
        Event::Start(Tag::Link {
            link_type,
            dest_url,
            title,
            id,
        }) if is_script_url(&dest_url) => Event::Start(Tag::Link {
            link_type,
            dest_url: CowStr::Borrowed("#"),
            title,
            id,
        }),
        other => other,
    });

    let mut out = String::with_capacity(markdown.len() * 3 / 2);
    html::push_html(&mut out, events);
    out
}

fn render_outcome(outcome: &Outcome) -> String {
    match outcome {
        Outcome::AwaitingVideo => format!(
            r#"<div class="banner info" role="status">📂 {}</div>"#,
            escape_html(INFO_NO_VIDEO)
        ),
        Outcome::Warning(message) => format!(
            r#"<div class="banner warning" role="alert">⚠️ {}</div>"#,
            escape_html(message)
        ),
        Outcome::Failed(description) => format!(
            r#"<div class="banner error" role="alert">❌ An error occurred during analysis: {}</div>"#,
            escape_html(description)
        ),
        Outcome::Done(result) => {
            let artifact = result.download();
            format!(
                r#"<section class="result">
        <h2>🧠 {heading}</h2>
        <div class="markdown" id="analysis-result">{markdown}</div>
        <form method="post" action="/download" class="download">
            <input type="hidden" name="content" value="{content}">
            <button type="submit">💾 Download Summary</button>
            <span class="hint">{filename}</span>
        </form>
    </section>"#,
                heading = RESULT_HEADING,
                markdown = render_markdown(&result.markdown),
                content = escape_html(&artifact.content),
                filename = escape_html(&artifact.filename),
            )
        }
    }
}

/// Render the full page for `outcome`, keeping the user's last query in the form.
pub fn render_page(outcome: &Outcome, query: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>Video Summarizer Agent</title>
    <style>
        body {{
            font-family: 'Segoe UI', Tahoma, Geneva, Verdana, sans-serif;
            max-width: 960px;
            margin: 0 auto;
            padding: 20px;
            line-height: 1.6;
            color: #262730;
        }}
        label {{
            display: block;
            font-weight: 600;
            margin: 16px 0 6px;
        }}
        textarea {{
            width: 100%;
            height: 100px;
            box-sizing: border-box;
        }}
        video {{
            max-width: 100%;
            margin-top: 12px;
        }}
        button {{
            margin-top: 12px;
            padding: 8px 16px;
            cursor: pointer;
        }}
        .subtitle {{
            color: #555;
        }}
        .banner {{
            padding: 12px 16px;
            border-radius: 6px;
            margin-top: 20px;
        }}
        .info {{ background: #e8f0fe; }}
        .warning {{ background: #fff8e1; }}
        .error {{ background: #fdecea; }}
        .markdown pre {{
            overflow-x: auto;
        }}
        .hint {{
            color: #888;
            margin-left: 8px;
        }}
        #spinner {{
            margin-top: 20px;
        }}
    </style>
</head>
<body>
    <h1>🎥 Video Summarizer Agent</h1>
    <p class="subtitle">This app is powered by Google Gemini + DuckDuckGo Search</p>

    <form id="analyze-form" method="post" action="/analyze" enctype="multipart/form-data">
        <label for="video">Upload a video file here</label>
        <input type="file" id="video" name="video" accept="{accept}" title="Upload a video for AI Analysis">
        <video id="preview" controls hidden></video>

        <label for="query">What insights are you seeking from the video?</label>
        <textarea id="query" name="query" placeholder="{placeholder}"
            title="Provide specific questions or insights you want from the video">{query}</textarea>

        <button type="submit">🔍 Analyze Video</button>
    </form>

    <div id="spinner" hidden>⏳ {spinner}</div>

    {outcome}

    <script>
        const input = document.getElementById('video');
        const preview = document.getElementById('preview');
        input.addEventListener('change', () => {{
            const file = input.files[0];
            if (preview.src) {{
                URL.revokeObjectURL(preview.src);
            }}
            if (file) {{
                preview.src = URL.createObjectURL(file);
                preview.hidden = false;
            }} else {{
                preview.removeAttribute('src');
                preview.hidden = true;
            }}
        }});
        document.getElementById('analyze-form').addEventListener('submit', () => {{
            document.getElementById('spinner').hidden = false;
        }});
    </script>
</body>
</html>
"#,
        accept = VideoFormat::accept_attribute(),
        placeholder = escape_html(QUERY_PLACEHOLDER),
        query = escape_html(query),
        spinner = SPINNER_TEXT,
        outcome = render_outcome(outcome),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use vsum_gemini::GeminiError;
    use vsum_models::QueryError;

    #[test]
    fn test_escape_html() {
        assert_eq!(
            escape_html(r#"<script>alert("x & 'y'")</script>"#),
            "&lt;script&gt;alert(&quot;x &amp; &#39;y&#39;&quot;)&lt;/script&gt;"
        );
        assert_eq!(escape_html("plain text"), "plain text");
    }

    #[test]
    fn test_idle_page_shows_only_info_banner() {
        let page = render_page(&Outcome::AwaitingVideo, "");
        assert!(page.contains(INFO_NO_VIDEO));
        assert!(!page.contains("banner warning"));
        assert!(!page.contains("banner error"));
        assert!(!page.contains("action=\"/download\""));
        assert!(page.contains(r#"accept=".mp4,.mov,.avi""#));
        assert!(page.contains(SPINNER_TEXT));
    }

    #[test]
    fn test_done_page_has_result_and_download() {
        let result = AnalysisResult::new("A cat walks across a table.", "gemini-2.0-flash-exp", 0);
        let page = render_page(&Outcome::Done(result), "What is happening in this video?");

        assert!(page.contains(RESULT_HEADING));
        assert!(page.contains(
            r#"<div class="markdown" id="analysis-result"><p>A cat walks across a table.</p>"#
        ));
        assert!(page.contains(r#"value="A cat walks across a table.""#));
        assert!(page.contains("video_summary.txt"));
        assert!(page.contains(">What is happening in this video?</textarea>"));
        assert!(!page.contains(INFO_NO_VIDEO));
    }

    #[test]
    fn test_failed_page_has_no_download() {
        let page = render_page(&Outcome::Failed("quota exceeded".to_string()), "q");
        assert!(page.contains("An error occurred during analysis: quota exceeded"));
        assert!(!page.contains("action=\"/download\""));
    }

    #[test]
    fn test_model_html_is_escaped() {
        let result = AnalysisResult::new("<b>bold</b>", "m", 0);
        let page = render_page(&Outcome::Done(result), "");
        assert!(page.contains("&lt;b&gt;bold&lt;/b&gt;"));
        assert!(!page.contains("<b>bold</b>"));
    }

    #[test]
    fn test_markdown_is_rendered() {
        let html = render_markdown("# Summary\n\nThe **cat** walks.\n\n- table\n- chair\n");
        assert!(html.contains("<h1>Summary</h1>"));
        assert!(html.contains("<strong>cat</strong>"));
        assert!(html.contains("<li>table</li>"));
        assert!(!html.contains("**"));
    }

    #[test]
    fn test_script_links_are_neutralised() {
        let html = render_markdown("[click](JavaScript:alert(1)) and [docs](https://example.com)");
        assert!(html.contains(r##"<a href="#">click</a>"##));
        assert!(html.contains(r#"<a href="https://example.com">docs</a>"#));
        assert!(!html.to_lowercase().contains("javascript:"));
    }

    #[test]
    fn test_outcome_from_pipeline_result() {
        assert_eq!(
            Outcome::from(Err(AnalysisError::NoVideo)),
            Outcome::AwaitingVideo
        );
        assert_eq!(
            Outcome::from(Err(AnalysisError::EmptyQuery(QueryError::Empty))),
            Outcome::Warning("Please enter a question or insight to analyze the video.".to_string())
        );

        let failed = Outcome::from(Err(AnalysisError::ModelInvocation(GeminiError::EmptyResponse)));
        assert_eq!(failed.phase(), RequestPhase::Failed);
        assert_eq!(Outcome::AwaitingVideo.phase(), RequestPhase::Idle);
    }
}
