//! Integration tests for the Gemini and Ollama clients against a mock server.

mod common;

use std::time::Duration;

use common::{GEMINI_PATH, gemini_body, gemini_env, ollama_body, ollama_env, resolve};
use ia_commits::config::Task;
use ia_commits::error::DispatchError;
use ia_commits::llm::{ProviderClient, create_provider};
use serde_json::json;
use wiremock::matchers::{body_partial_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn test_gemini_returns_generated_text() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(GEMINI_PATH))
        .and(query_param("key", "test-key"))
        .and(body_partial_json(json!({
            "contents": [{"parts": [{"text": "the prompt"}]}],
            "generationConfig": {"maxOutputTokens": 300}
        })))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(gemini_body("feat(api): add endpoint")),
        )
        .expect(1)
        .mount(&server)
        .await;

    let config = resolve(Task::Suggest, &gemini_env(&server, &[]));
    let provider = create_provider(&config).unwrap();

    let response = provider.generate("the prompt", &config).await.unwrap();

    assert_eq!(response.generated_text, "feat(api): add endpoint");
    assert!(response.raw_body.contains("candidates"));
}

#[tokio::test]
async fn test_gemini_verify_requests_json_output() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(GEMINI_PATH))
        .and(body_partial_json(json!({
            "generationConfig": {"responseMimeType": "application/json"}
        })))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(gemini_body(r#"{"valid": true, "reason": null}"#)),
        )
        .expect(1)
        .mount(&server)
        .await;

    let config = resolve(Task::Verify, &gemini_env(&server, &[]));
    let provider = create_provider(&config).unwrap();

    let response = provider.generate("judge this", &config).await.unwrap();
    assert_eq!(response.generated_text, r#"{"valid": true, "reason": null}"#);
}

#[tokio::test]
async fn test_gemini_error_field_with_ok_status() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(GEMINI_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "error": {
                "code": 429,
                "message": "Resource has been exhausted",
                "status": "RESOURCE_EXHAUSTED"
            }
        })))
        .mount(&server)
        .await;

    let config = resolve(Task::Suggest, &gemini_env(&server, &[]));
    let provider = create_provider(&config).unwrap();

    let err = provider.generate("p", &config).await.unwrap_err();
    match err {
        DispatchError::Provider { provider, message } => {
            assert_eq!(provider, "gemini");
            assert!(message.contains("Resource has been exhausted"));
        }
        other => panic!("Expected Provider error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_gemini_server_error_status() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(GEMINI_PATH))
        .respond_with(ResponseTemplate::new(500).set_body_string("upstream exploded"))
        .mount(&server)
        .await;

    let config = resolve(Task::Suggest, &gemini_env(&server, &[]));
    let provider = create_provider(&config).unwrap();

    let err = provider.generate("p", &config).await.unwrap_err();
    match err {
        DispatchError::Status { status, body, .. } => {
            assert_eq!(status, 500);
            assert_eq!(body, "upstream exploded");
        }
        other => panic!("Expected Status error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_gemini_malformed_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(GEMINI_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>not json</html>"))
        .mount(&server)
        .await;

    let config = resolve(Task::Suggest, &gemini_env(&server, &[]));
    let provider = create_provider(&config).unwrap();

    let err = provider.generate("p", &config).await.unwrap_err();
    assert!(matches!(err, DispatchError::MalformedBody { .. }), "got {:?}", err);
}

#[tokio::test]
async fn test_gemini_missing_candidates() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(GEMINI_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "promptFeedback": {"blockReason": "SAFETY"}
        })))
        .mount(&server)
        .await;

    let config = resolve(Task::Suggest, &gemini_env(&server, &[]));
    let provider = create_provider(&config).unwrap();

    let err = provider.generate("p", &config).await.unwrap_err();
    assert!(matches!(err, DispatchError::MissingText { provider: "gemini" }), "got {:?}", err);
}

#[tokio::test]
async fn test_gemini_timeout() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(GEMINI_PATH))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(gemini_body("too late"))
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&server)
        .await;

    let config = resolve(Task::Suggest, &gemini_env(&server, &[("API_TIMEOUT_SECONDS", "1")]));
    let provider = create_provider(&config).unwrap();

    let err = provider.generate("p", &config).await.unwrap_err();
    assert!(
        matches!(err, DispatchError::Timeout { provider: "gemini", secs: 1 }),
        "got {:?}",
        err
    );
}

#[tokio::test]
async fn test_unreachable_server_is_transport_error() {
    let server = MockServer::builder().start().await;
    let env = gemini_env(&server, &[]);
    drop(server);

    let config = resolve(Task::Suggest, &env);
    let provider = create_provider(&config).unwrap();

    let err = provider.generate("p", &config).await.unwrap_err();
    assert!(matches!(err, DispatchError::Transport { .. }), "got {:?}", err);
}

#[tokio::test]
async fn test_transport_error_does_not_leak_api_key() {
    let server = MockServer::builder().start().await;
    let env = gemini_env(&server, &[("GEMINI_API_KEY", "sekrit-key")]);
    drop(server);

    let config = resolve(Task::Verify, &env);
    let provider = create_provider(&config).unwrap();

    let err = provider.generate("p", &config).await.unwrap_err();
    assert!(matches!(err, DispatchError::Transport { .. }), "got {:?}", err);
    assert!(!err.to_string().contains("sekrit-key"), "key in: {}", err);
    assert!(!format!("{:?}", err).contains("sekrit-key"), "key in: {:?}", err);
}

#[tokio::test]
async fn test_ollama_returns_generated_text() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/generate"))
        .and(body_partial_json(json!({
            "model": "llama3",
            "prompt": "the prompt",
            "stream": false
        })))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(ollama_body("fix(ui): align header")),
        )
        .expect(1)
        .mount(&server)
        .await;

    let config = resolve(Task::Suggest, &ollama_env(&server, &[]));
    let provider = create_provider(&config).unwrap();

    let response = provider.generate("the prompt", &config).await.unwrap();
    assert_eq!(response.generated_text, "fix(ui): align header");
}

#[tokio::test]
async fn test_ollama_verify_requests_json_format() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/generate"))
        .and(body_partial_json(json!({"format": "json"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(ollama_body(r#"{"valid": false}"#)))
        .expect(1)
        .mount(&server)
        .await;

    let config = resolve(Task::Verify, &ollama_env(&server, &[]));
    let provider = create_provider(&config).unwrap();

    let response = provider.generate("judge", &config).await.unwrap();
    assert_eq!(response.generated_text, r#"{"valid": false}"#);
}

#[tokio::test]
async fn test_ollama_model_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/generate"))
        .respond_with(
            ResponseTemplate::new(404).set_body_json(json!({"error": "model 'llama3' not found"})),
        )
        .mount(&server)
        .await;

    let config = resolve(Task::Suggest, &ollama_env(&server, &[]));
    let provider = create_provider(&config).unwrap();

    let err = provider.generate("p", &config).await.unwrap_err();
    match err {
        DispatchError::Provider { provider, message } => {
            assert_eq!(provider, "ollama");
            assert_eq!(message, "model 'llama3' not found");
        }
        other => panic!("Expected Provider error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_ollama_url_with_trailing_slash() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/generate"))
        .respond_with(ResponseTemplate::new(200).set_body_json(ollama_body("chore: tidy")))
        .expect(1)
        .mount(&server)
        .await;

    let url = format!("{}/", server.uri());
    let config = resolve(Task::Suggest, &ollama_env(&server, &[("OLLAMA_URL", url.as_str())]));
    let provider = create_provider(&config).unwrap();

    assert!(provider.generate("p", &config).await.is_ok());
}
