//! Full request flow against mocked Gemini and DuckDuckGo endpoints.

use std::time::Duration;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use serde_json::json;
use tower::ServiceExt;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use vsum_api::{create_router, ApiConfig, AppState};
use vsum_gemini::{GeminiConfig, SearchConfig};

const BOUNDARY: &str = "gemini-flow-boundary";

fn file_json(state: &str) -> serde_json::Value {
    json!({
        "name": "files/abc123",
        "displayName": "clip.mp4",
        "mimeType": "video/mp4",
        "uri": "https://generativelanguage.test/v1beta/files/abc123",
        "state": state,
    })
}

async fn mount_gemini(server: &MockServer, final_state: serde_json::Value, answer: &str) {
    Mock::given(method("POST"))
        .and(path("/upload/v1beta/files"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("x-goog-upload-url", format!("{}/upload-session/1", server.uri())),
        )
        .expect(1)
        .mount(server)
        .await;
    Mock::given(method("POST"))
        .and(path("/upload-session/1"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "file": file_json("PROCESSING") })),
        )
        .expect(1)
        .mount(server)
        .await;

    // One more PROCESSING, then the final state
    Mock::given(method("GET"))
        .and(path("/v1beta/files/abc123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(file_json("PROCESSING")))
        .up_to_n_times(1)
        .with_priority(1)
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v1beta/files/abc123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(final_state))
        .with_priority(2)
        .mount(server)
        .await;

    Mock::given(method("POST"))
        .and(path("/v1beta/models/gemini-2.0-flash-exp:generateContent"))
        .and(body_partial_json(json!({
            "contents": [{
                "role": "user",
                "parts": [{
                    "fileData": {
                        "mimeType": "video/mp4",
                        "fileUri": "https://generativelanguage.test/v1beta/files/abc123"
                    }
                }]
            }]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "candidates": [{
                "content": { "role": "model", "parts": [{ "text": answer }] },
                "finishReason": "STOP"
            }]
        })))
        .mount(server)
        .await;
}

fn app_for(server: &MockServer, upload_dir: &std::path::Path) -> axum::Router {
    let config = ApiConfig {
        upload_dir: upload_dir.to_path_buf(),
        gemini: GeminiConfig {
            api_key: Some("test-key".to_string()),
            base_url: server.uri(),
            poll_interval: Duration::from_millis(5),
            max_poll_attempts: 10,
            ..Default::default()
        },
        search: SearchConfig {
            base_url: server.uri(),
            ..Default::default()
        },
        ..Default::default()
    };
    create_router(AppState::new(config).unwrap(), None)
}

fn analyze_request(query: &str) -> Request<Body> {
    let body = format!(
        "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"video\"; filename=\"clip.mp4\"\r\n\
         Content-Type: video/mp4\r\n\r\nnot really a video\r\n\
         --{BOUNDARY}\r\nContent-Disposition: form-data; name=\"query\"\r\n\r\n{query}\r\n\
         --{BOUNDARY}--\r\n"
    );
    Request::builder()
        .method("POST")
        .uri("/analyze")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .body(Body::from(body))
        .unwrap()
}

#[tokio::test]
async fn test_clip_analysis_end_to_end() {
    let server = MockServer::start().await;
    mount_gemini(&server, file_json("ACTIVE"), "A cat walks across a table.").await;
    let upload_dir = tempfile::tempdir().unwrap();
    let app = app_for(&server, upload_dir.path());

    let response = app
        .oneshot(analyze_request("What is happening in this video?"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let page = String::from_utf8(body.to_vec()).unwrap();

    assert!(page.contains(
        r#"<div class="markdown" id="analysis-result"><p>A cat walks across a table.</p>"#
    ));
    assert!(page.contains(r#"name="content" value="A cat walks across a table.""#));

    let requests = server.received_requests().await.unwrap();
    let polls = requests
        .iter()
        .filter(|r| r.method.to_string() == "GET")
        .count();
    assert_eq!(polls, 2);

    let prompt_request = requests
        .iter()
        .find(|r| r.url.path().ends_with(":generateContent"))
        .unwrap();
    let prompt: serde_json::Value = serde_json::from_slice(&prompt_request.body).unwrap();
    let text = prompt["contents"][0]["parts"][1]["text"].as_str().unwrap();
    assert!(text.contains("\nWhat is happening in this video?\n"));

    assert_eq!(std::fs::read_dir(upload_dir.path()).unwrap().count(), 0);
}

#[tokio::test]
async fn test_failed_processing_skips_model() {
    let server = MockServer::start().await;
    let mut failed = file_json("FAILED");
    failed["error"] = json!({ "code": 400, "message": "Video is corrupt" });
    mount_gemini(&server, failed, "unused").await;
    let upload_dir = tempfile::tempdir().unwrap();
    let app = app_for(&server, upload_dir.path());

    let response = app.oneshot(analyze_request("What happens?")).await.unwrap();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let page = String::from_utf8(body.to_vec()).unwrap();

    assert!(page.contains("An error occurred during analysis:"));
    assert!(page.contains("Video is corrupt"));

    let requests = server.received_requests().await.unwrap();
    assert!(!requests
        .iter()
        .any(|r| r.url.path().ends_with(":generateContent")));
    assert_eq!(std::fs::read_dir(upload_dir.path()).unwrap().count(), 0);
}
