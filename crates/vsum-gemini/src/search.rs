//! Web search backend exposed to the model as a function.

use async_trait::async_trait;
use reqwest::{Client, Url};
use scraper::{ElementRef, Html, Selector};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::debug;

use crate::config::SearchConfig;
use crate::error::{GeminiError, GeminiResult};
use crate::types::FunctionDeclaration;

/// Function name the model uses to request a search.
pub const SEARCH_FUNCTION: &str = "duckduckgo_search";

/// One search result, in the shape handed back to the model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchHit {
    pub title: String,
    pub href: String,
    pub body: String,
}

/// A general web search capability.
#[async_trait]
pub trait WebSearch: Send + Sync {
    async fn search(&self, query: &str, max_results: usize) -> GeminiResult<Vec<SearchHit>>;

    /// Result count used when the model does not ask for one.
    fn default_max_results(&self) -> usize {
        5
    }
}

/// Declaration of the search function sent with every model request.
pub fn search_declaration() -> FunctionDeclaration {
    FunctionDeclaration {
        name: SEARCH_FUNCTION.to_string(),
        description: "Search the web with DuckDuckGo. Returns a list of results with \
                      title, href and body."
            .to_string(),
        parameters: json!({
            "type": "OBJECT",
            "properties": {
                "query": {
                    "type": "STRING",
                    "description": "The query to search for."
                },
                "max_results": {
                    "type": "INTEGER",
                    "description": "The maximum number of results to return."
                }
            },
            "required": ["query"]
        }),
    }
}

const RESULT_SELECTOR: &str = "div.result";
const TITLE_SELECTOR: &str = "a.result__a";
const SNIPPET_SELECTOR: &str = ".result__snippet";
const AD_CLASS: &str = "result--ad";

fn selector(css: &str) -> GeminiResult<Selector> {
    Selector::parse(css).map_err(|e| GeminiError::search(format!("invalid selector {css}: {e:?}")))
}

/// Collapse the text of an element into a single line.
fn text_of(element: ElementRef<'_>) -> String {
    element
        .text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Result links go through a `/l/?uddg=<target>` redirect; return the target.
fn resolve_href(href: &str) -> Option<String> {
    let absolute = if href.starts_with("//") {
        format!("https:{href}")
    } else {
        href.to_string()
    };
    let url = Url::parse(&absolute).ok()?;
    if url.path() == "/l/" {
        return url
            .query_pairs()
            .find(|(key, _)| key == "uddg")
            .map(|(_, target)| target.into_owned());
    }
    Some(absolute)
}

/// Extract organic results from a DuckDuckGo HTML results page.
fn parse_results(html: &str, max_results: usize) -> GeminiResult<Vec<SearchHit>> {
    let result = selector(RESULT_SELECTOR)?;
    let title = selector(TITLE_SELECTOR)?;
    let snippet = selector(SNIPPET_SELECTOR)?;

    let document = Html::parse_document(html);
    let hits = document
        .select(&result)
        .filter(|node| !node.value().classes().any(|class| class == AD_CLASS))
        .filter_map(|node| {
            let link = node.select(&title).next()?;
            let href = resolve_href(link.value().attr("href")?)?;
            Some(SearchHit {
                title: text_of(link),
                href,
                body: node.select(&snippet).next().map(text_of).unwrap_or_default(),
            })
        })
        .take(max_results)
        .collect();

    Ok(hits)
}

/// Search backed by DuckDuckGo's HTML results page.
#[derive(Clone)]
pub struct DuckDuckGoSearch {
    config: SearchConfig,
    client: Client,
}

impl DuckDuckGoSearch {
    pub fn new(config: SearchConfig) -> GeminiResult<Self> {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .user_agent(config.user_agent.as_str())
            .build()?;
        Ok(Self { config, client })
    }
}

#[async_trait]
impl WebSearch for DuckDuckGoSearch {
    async fn search(&self, query: &str, max_results: usize) -> GeminiResult<Vec<SearchHit>> {
        debug!(query, max_results, "Running web search");

        let response = self
            .client
            .post(format!("{}/html/", self.config.base_url))
            .form(&[("q", query)])
            .send()
            .await
            .map_err(|e| GeminiError::search(e.without_url().to_string()))?;

        if !response.status().is_success() {
            return Err(GeminiError::search(format!(
                "DuckDuckGo returned {}",
                response.status()
            )));
        }

        let body = response
            .text()
            .await
            .map_err(|e| GeminiError::search(e.without_url().to_string()))?;
        let hits = parse_results(&body, max_results)?;
        debug!(query, hits = hits.len(), "Web search finished");

        Ok(hits)
    }

    fn default_max_results(&self) -> usize {
        self.config.max_results
    }
}

/// Run a search function call and build the payload returned to the model.
///
/// Failures are reported to the model instead of aborting the answer.
pub async fn run_search_call(search: &dyn WebSearch, args: &Value) -> Value {
    let Some(query) = args.get("query").and_then(Value::as_str) else {
        return json!({ "error": "missing required argument: query" });
    };
    let max_results = args
        .get("max_results")
        .and_then(Value::as_u64)
        .map(|n| n as usize)
        .unwrap_or_else(|| search.default_max_results())
        .max(1);

    match search.search(query, max_results).await {
        Ok(hits) => json!({ "results": hits }),
        Err(e) => {
            tracing::warn!(query, error = %e, "Web search failed");
            json!({ "error": e.to_string() })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_string_contains, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const RESULTS_PAGE: &str = r#"<!DOCTYPE html>
<html><body><div id="links" class="results">
  <div class="result results_links results_links_deep result--ad">
    <div class="links_main links_deep result__body">
      <h2 class="result__title"><a class="result__a" href="https://ads.example/click">Buy cat tables</a></h2>
      <a class="result__snippet" href="https://ads.example/click">Sponsored</a>
    </div>
  </div>
  <div class="result results_links results_links_deep web-result">
    <div class="links_main links_deep result__body">
      <h2 class="result__title">
        <a rel="nofollow" class="result__a" href="//duckduckgo.com/l/?uddg=https%3A%2F%2Fexample.com%2Fcats%3Fpage%3D2&amp;rut=abc">Why cats
          walk on tables</a>
      </h2>
      <a class="result__snippet" href="//duckduckgo.com/l/?uddg=https%3A%2F%2Fexample.com%2Fcats">Cats like <b>high</b> places.</a>
    </div>
  </div>
  <div class="result results_links results_links_deep web-result">
    <div class="links_main links_deep result__body">
      <h2 class="result__title"><a class="result__a" href="https://en.wikipedia.org/wiki/Cat">Cat - Wikipedia</a></h2>
      <a class="result__snippet" href="https://en.wikipedia.org/wiki/Cat">The cat is a small domesticated carnivorous mammal.</a>
    </div>
  </div>
  <div class="result results_links results_links_deep web-result">
    <div class="links_main links_deep result__body">
      <h2 class="result__title"><a class="result__a" href="https://example.org/kittens">Kittens</a></h2>
    </div>
  </div>
</div></body></html>"#;

    const NO_RESULTS_PAGE: &str = r#"<html><body><div id="links" class="results">
  <div class="no-results">No results.</div>
</div></body></html>"#;

    fn search_for(server: &MockServer) -> DuckDuckGoSearch {
        DuckDuckGoSearch::new(SearchConfig {
            base_url: server.uri(),
            ..Default::default()
        })
        .unwrap()
    }

    #[tokio::test]
    async fn test_search_returns_organic_results() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/html/"))
            .and(body_string_contains("q=reviews+of+cat+tables"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string(RESULTS_PAGE)
                    .insert_header("content-type", "text/html; charset=UTF-8"),
            )
            .mount(&server)
            .await;

        let hits = search_for(&server)
            .search("reviews of cat tables", 10)
            .await
            .unwrap();

        assert_eq!(hits.len(), 3);
        assert_eq!(hits[0].title, "Why cats walk on tables");
        assert_eq!(hits[0].href, "https://example.com/cats?page=2");
        assert_eq!(hits[0].body, "Cats like high places.");
        assert_eq!(hits[1].title, "Cat - Wikipedia");
        assert_eq!(hits[1].href, "https://en.wikipedia.org/wiki/Cat");
        assert_eq!(hits[2].title, "Kittens");
        assert_eq!(hits[2].body, "");
    }

    #[tokio::test]
    async fn test_search_respects_max_results() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_string(RESULTS_PAGE))
            .mount(&server)
            .await;

        let hits = search_for(&server).search("cat", 1).await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].title, "Why cats walk on tables");
    }

    #[tokio::test]
    async fn test_page_without_results_gives_empty_list() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_string(NO_RESULTS_PAGE))
            .mount(&server)
            .await;

        let search = search_for(&server);
        let payload = run_search_call(&search, &json!({"query": "zzzz qqqq"})).await;
        assert_eq!(payload, json!({ "results": [] }));
    }

    #[test]
    fn test_resolve_href() {
        assert_eq!(
            resolve_href("//duckduckgo.com/l/?uddg=https%3A%2F%2Fexample.com%2F&rut=x").as_deref(),
            Some("https://example.com/")
        );
        assert_eq!(
            resolve_href("https://example.com/a").as_deref(),
            Some("https://example.com/a")
        );
        assert_eq!(resolve_href("not a url"), None);
    }

    #[tokio::test]
    async fn test_failed_search_becomes_error_payload() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let search = search_for(&server);
        let payload = run_search_call(&search, &json!({"query": "cat"})).await;
        assert!(payload["error"].as_str().unwrap().contains("503"));
    }

    #[tokio::test]
    async fn test_missing_query_argument() {
        let server = MockServer::start().await;
        let search = search_for(&server);
        let payload = run_search_call(&search, &json!({})).await;
        assert_eq!(payload["error"], "missing required argument: query");
        assert!(server.received_requests().await.unwrap().is_empty());
    }
}
