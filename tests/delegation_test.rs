//! HTTP tests for the OpenAI-compatible delegate.
//!
//! A local mock server stands in for the chat completions endpoint, so every
//! failure the provider can produce is exercised over a real connection,
//! both at the delegate boundary and through the engine's fallback.

use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use toolfinder::delegate::OpenAiDelegate;
use toolfinder::{
    DelegationError, DelegationRequest, KeywordTable, SearchDelegate, SearchEngine, SearchMode,
    ToolRecord,
};
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const QUERY: &str = "i need a shape generator";
const API_KEY: &str = "sk-test";

fn catalog() -> Vec<ToolRecord> {
    vec![
        ToolRecord::new("Alpha", "Sphere and shape generator"),
        ToolRecord::new("Beta", "Stores notes"),
    ]
}

/// Chat completion whose first choice carries `content`.
fn completion(content: &str) -> Value {
    json!({
        "choices": [{
            "message": { "role": "assistant", "content": content }
        }]
    })
}

/// Start a mock endpoint answering every completion call with `response`.
async fn mock_provider(response: ResponseTemplate) -> (MockServer, OpenAiDelegate) {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(header("authorization", "Bearer sk-test"))
        .respond_with(response)
        .mount(&server)
        .await;

    let delegate = OpenAiDelegate::new(API_KEY)
        .with_base_url(format!("{}/v1/chat/completions", server.uri()))
        .with_model("test-model");
    (server, delegate)
}

fn engine_with(delegate: OpenAiDelegate) -> SearchEngine {
    SearchEngine::new(KeywordTable::empty())
        .with_delegate(Arc::new(delegate), Duration::from_secs(5))
}

fn request() -> DelegationRequest {
    DelegationRequest::new(QUERY, &["Alpha", "Beta"])
}

#[tokio::test]
async fn test_successful_reply_is_delegated() {
    let reply = completion(r#"{"relevant_tools": ["Beta"]}"#);
    let (_server, delegate) = mock_provider(ResponseTemplate::new(200).set_body_json(reply)).await;

    let response = delegate.select(&request()).await.unwrap();
    assert_eq!(response.relevant_tools, vec!["Beta"]);

    let results = engine_with(delegate).search(QUERY, &catalog()).await;
    assert_eq!(results.mode, SearchMode::Delegated);
    assert_eq!(results.names(), vec!["Beta"]);
}

#[tokio::test]
async fn test_unauthorized_maps_to_auth_and_falls_back() {
    let (_server, delegate) = mock_provider(ResponseTemplate::new(401)).await;

    let err = delegate.select(&request()).await.unwrap_err();
    assert!(matches!(err, DelegationError::Auth(_)));

    let results = engine_with(delegate).search(QUERY, &catalog()).await;
    assert_eq!(results.mode, SearchMode::Ranked);
    assert_eq!(results.names(), vec!["Alpha"]);
}

#[tokio::test]
async fn test_server_error_maps_to_provider_and_falls_back() {
    let (_server, delegate) =
        mock_provider(ResponseTemplate::new(500).set_body_string("boom")).await;

    match delegate.select(&request()).await {
        Err(DelegationError::Provider { status, message }) => {
            assert_eq!(status, 500);
            assert_eq!(message, "boom");
        }
        other => panic!("expected provider error, got {:?}", other),
    }

    let results = engine_with(delegate).search(QUERY, &catalog()).await;
    assert_eq!(results.mode, SearchMode::Ranked);
    assert_eq!(results.names(), vec!["Alpha"]);
}

#[tokio::test]
async fn test_unexpected_content_maps_to_parse_and_falls_back() {
    let reply = completion("Sure! You should try Beta.");
    let (_server, delegate) = mock_provider(ResponseTemplate::new(200).set_body_json(reply)).await;

    let err = delegate.select(&request()).await.unwrap_err();
    assert!(matches!(err, DelegationError::Parse(_)));

    let results = engine_with(delegate).search(QUERY, &catalog()).await;
    assert_eq!(results.mode, SearchMode::Ranked);
    assert_eq!(results.names(), vec!["Alpha"]);
}

#[tokio::test]
async fn test_non_completion_body_maps_to_parse() {
    let (_server, delegate) =
        mock_provider(ResponseTemplate::new(200).set_body_string("<html></html>")).await;

    let err = delegate.select(&request()).await.unwrap_err();
    assert!(matches!(err, DelegationError::Parse(_)));
}

#[tokio::test]
async fn test_keyword_query_never_reaches_provider() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&server)
        .await;
    let delegate = OpenAiDelegate::new(API_KEY).with_base_url(server.uri());

    let results = engine_with(delegate).search("shape", &catalog()).await;

    assert_eq!(results.mode, SearchMode::Ranked);
    assert_eq!(results.names(), vec!["Alpha"]);
}
