//! Backend integration tests against a mocked generation API

use serde_json::json;
use text_assist_gateway::backend::create_text_backend;
use text_assist_gateway::config::{BackendConfig, ProtocolType};
use text_assist_gateway::AppError;
use wiremock::matchers::{body_partial_json, header, method, path, query_param_is_missing};
use wiremock::{Mock, MockServer, ResponseTemplate};

const GEMINI_PATH: &str = "/v1beta/models/gemini-2.0-flash-lite:generateContent";

fn gemini_config(server: &MockServer) -> BackendConfig {
    BackendConfig {
        endpoint: format!("{}/v1beta", server.uri()),
        api_key: Some("upstream-key".to_string()),
        timeout_ms: 5000,
        ..Default::default()
    }
}

fn openai_config(server: &MockServer) -> BackendConfig {
    BackendConfig {
        name: "local-llm".to_string(),
        protocol: ProtocolType::OpenAI,
        endpoint: format!("{}/v1", server.uri()),
        model: "llama3".to_string(),
        api_key: Some("sk-test".to_string()),
        timeout_ms: 5000,
        ..Default::default()
    }
}

#[tokio::test]
async fn test_gemini_generate() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(GEMINI_PATH))
        .and(header("x-goog-api-key", "upstream-key"))
        .and(query_param_is_missing("key"))
        .and(body_partial_json(json!({
            "contents": [{"parts": [{"text": "Say hi"}]}]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "candidates": [{
                "content": {"role": "model", "parts": [{"text": "Hi"}, {"text": " there"}]},
                "finishReason": "STOP"
            }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let backend = create_text_backend(&gemini_config(&server)).unwrap();
    assert_eq!(backend.protocol(), "gemini");

    let reply = backend.generate("Say hi").await.unwrap();
    assert_eq!(reply, "Hi there");
}

#[tokio::test]
async fn test_gemini_generation_config_forwarded() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(GEMINI_PATH))
        .and(body_partial_json(json!({
            "generationConfig": {"maxOutputTokens": 128}
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "candidates": [{"content": {"parts": [{"text": "ok"}]}}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let config = BackendConfig {
        max_output_tokens: Some(128),
        ..gemini_config(&server)
    };
    let backend = create_text_backend(&config).unwrap();

    assert_eq!(backend.generate("anything").await.unwrap(), "ok");
}

#[tokio::test]
async fn test_gemini_error_status() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(GEMINI_PATH))
        .respond_with(ResponseTemplate::new(429).set_body_string("quota exceeded"))
        .mount(&server)
        .await;

    let backend = create_text_backend(&gemini_config(&server)).unwrap();
    let err = backend.generate("Say hi").await.unwrap_err();

    match err {
        AppError::BackendError(message) => {
            assert!(message.contains("429"));
            assert!(message.contains("quota exceeded"));
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

#[tokio::test]
async fn test_gemini_blocked_prompt() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(GEMINI_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "promptFeedback": {"blockReason": "SAFETY"}
        })))
        .mount(&server)
        .await;

    let backend = create_text_backend(&gemini_config(&server)).unwrap();
    let err = backend.generate("something unsafe").await.unwrap_err();

    assert!(err.to_string().contains("SAFETY"));
}

#[tokio::test]
async fn test_openai_generate() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(header("authorization", "Bearer sk-test"))
        .and(body_partial_json(json!({
            "model": "llama3",
            "messages": [{"role": "user", "content": "Explain tides"}]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "chatcmpl-1",
            "object": "chat.completion",
            "choices": [{
                "index": 0,
                "message": {"role": "assistant", "content": "The moon pulls."},
                "finish_reason": "stop"
            }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let backend = create_text_backend(&openai_config(&server)).unwrap();
    assert_eq!(backend.name(), "local-llm");
    assert_eq!(backend.model(), "llama3");

    let reply = backend.generate("Explain tides").await.unwrap();
    assert_eq!(reply, "The moon pulls.");
}

#[tokio::test]
async fn test_openai_empty_choices() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"choices": []})))
        .mount(&server)
        .await;

    let backend = create_text_backend(&openai_config(&server)).unwrap();
    let result = backend.generate("Explain tides").await;

    assert!(matches!(result, Err(AppError::BackendError(_))));
}

#[tokio::test]
async fn test_unreachable_backend() {
    let config = BackendConfig {
        endpoint: "http://127.0.0.1:1/v1beta".to_string(),
        api_key: Some("k".to_string()),
        timeout_ms: 2000,
        ..Default::default()
    };
    let backend = create_text_backend(&config).unwrap();

    let result = backend.generate("hello").await;
    assert!(matches!(result, Err(AppError::HttpClient(_))));
}

#[tokio::test]
async fn test_unreachable_backend_does_not_leak_key() {
    let config = BackendConfig {
        endpoint: "http://127.0.0.1:1/v1beta".to_string(),
        api_key: Some("SUPER-SECRET-GEMINI-KEY".to_string()),
        timeout_ms: 2000,
        ..Default::default()
    };
    let backend = create_text_backend(&config).unwrap();

    let err = backend.generate("hello").await.unwrap_err();
    let embedded = format!("Error: {}", err);

    assert!(!embedded.contains("SUPER-SECRET-GEMINI-KEY"), "{}", embedded);
    assert!(!embedded.contains("127.0.0.1:1"), "{}", embedded);
}

#[tokio::test]
async fn test_gemini_health_check() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1beta/models/gemini-2.0-flash-lite"))
        .and(header("x-goog-api-key", "upstream-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "name": "models/gemini-2.0-flash-lite"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let backend = create_text_backend(&gemini_config(&server)).unwrap();
    assert!(backend.health_check().await);
}

#[tokio::test]
async fn test_gemini_health_check_rejected_key() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1beta/models/gemini-2.0-flash-lite"))
        .respond_with(ResponseTemplate::new(403).set_body_string("API key not valid"))
        .mount(&server)
        .await;

    let backend = create_text_backend(&gemini_config(&server)).unwrap();
    assert!(!backend.health_check().await);
}

#[tokio::test]
async fn test_openai_health_check_accepts_unauthorized() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/models"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let backend = create_text_backend(&openai_config(&server)).unwrap();
    assert!(backend.health_check().await);
}

#[tokio::test]
async fn test_health_check_unreachable() {
    let config = BackendConfig {
        endpoint: "http://127.0.0.1:1/v1beta".to_string(),
        timeout_ms: 2000,
        ..Default::default()
    };
    let backend = create_text_backend(&config).unwrap();

    assert!(!backend.health_check().await);
}
