#![cfg(feature = "openai")]

use std::time::Duration;

use colloquy::client::ChatClient;
use colloquy::config::{ClientConfig, Credentials, Endpoint};
use colloquy::error::{ColloquyError, ErrorCategory};
use colloquy::provider::openai::OpenAiProvider;
use colloquy::provider::{ModelProvider, ProviderRequest};
use colloquy::types::{ChatMessage, FinishReason, GenerationSettings};
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn request() -> ProviderRequest {
    ProviderRequest {
        model: "gpt-4o-mini".to_string(),
        messages: vec![ChatMessage::system("be brief"), ChatMessage::user("hi")],
        settings: GenerationSettings::default(),
    }
}

fn provider(server: &MockServer) -> OpenAiProvider {
    OpenAiProvider::new("test-key".to_string(), server.uri(), reqwest::Client::new())
}

fn completion_body(text: &str) -> serde_json::Value {
    json!({
        "id": "chatcmpl-1",
        "object": "chat.completion",
        "choices": [{
            "index": 0,
            "message": {"role": "assistant", "content": text},
            "finish_reason": "stop"
        }],
        "usage": {"prompt_tokens": 12, "completion_tokens": 3, "total_tokens": 15}
    })
}

#[tokio::test]
async fn chat_completion_happy_path() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(header("authorization", "Bearer test-key"))
        .and(body_json(json!({
            "model": "gpt-4o-mini",
            "messages": [
                {"role": "system", "content": "be brief"},
                {"role": "user", "content": "hi"}
            ]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion_body("hello back")))
        .expect(1)
        .mount(&server)
        .await;

    let response = provider(&server).generate_text(&request()).await.unwrap();

    assert_eq!(response.text, "hello back");
    assert_eq!(response.usage.input_tokens, 12);
    assert_eq!(response.usage.output_tokens, 3);
    assert_eq!(response.usage.total_tokens, 15);
    assert_eq!(response.finish_reason, Some(FinishReason::Stop));
}

#[tokio::test]
async fn generation_settings_are_forwarded() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(body_json(json!({
            "model": "gpt-4o-mini",
            "messages": [
                {"role": "system", "content": "be brief"},
                {"role": "user", "content": "hi"}
            ],
            "max_tokens": 64,
            "temperature": 0.5
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion_body("ok")))
        .expect(1)
        .mount(&server)
        .await;

    let mut req = request();
    req.settings = GenerationSettings::builder()
        .max_tokens(64)
        .temperature(0.5)
        .build();

    let response = provider(&server).generate_text(&req).await.unwrap();
    assert_eq!(response.text, "ok");
}

#[tokio::test]
async fn unauthorized_maps_to_authentication_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "error": {"message": "Incorrect API key provided", "type": "invalid_request_error"}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let err = provider(&server).generate_text(&request()).await.unwrap_err();

    match err {
        ColloquyError::Authentication(ref msg) => assert_eq!(msg, "Incorrect API key provided"),
        ref other => panic!("expected authentication error, got {other:?}"),
    }
    assert_eq!(err.category(), ErrorCategory::Remote);
}

#[tokio::test]
async fn server_error_is_not_retried() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(500).set_body_string("upstream exploded"))
        .expect(1)
        .mount(&server)
        .await;

    let err = provider(&server).generate_text(&request()).await.unwrap_err();

    match err {
        ColloquyError::Api { status, message } => {
            assert_eq!(status, 500);
            assert_eq!(message, "upstream exploded");
        }
        other => panic!("expected api error, got {other:?}"),
    }
}

#[tokio::test]
async fn empty_choices_is_an_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"choices": []})))
        .mount(&server)
        .await;

    let err = provider(&server).generate_text(&request()).await.unwrap_err();
    assert!(matches!(err, ColloquyError::Api { .. }));
}

#[tokio::test]
async fn malformed_body_is_a_serialization_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let err = provider(&server).generate_text(&request()).await.unwrap_err();
    assert!(matches!(err, ColloquyError::Serialization(_)));
}

#[tokio::test]
async fn unreachable_endpoint_is_a_transport_error() {
    let provider = OpenAiProvider::new(
        "test-key".to_string(),
        "http://127.0.0.1:1",
        reqwest::Client::new(),
    );

    let err = provider.generate_text(&request()).await.unwrap_err();

    assert_eq!(err.category(), ErrorCategory::Transport);
}

#[tokio::test]
async fn slow_endpoint_times_out() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(completion_body("late"))
                .set_delay(Duration::from_secs(5)),
        )
        .mount(&server)
        .await;

    let config = ClientConfig::new(
        Credentials::for_endpoint(Endpoint::OpenAi, Some("test-key".into()))
            .with_base_url(server.uri()),
        "gpt-4o-mini",
    )
    .with_timeout(Some(Duration::from_millis(100)));

    let err = OpenAiProvider::from_config(&config)
        .unwrap()
        .generate_text(&request())
        .await
        .unwrap_err();

    assert_eq!(err.category(), ErrorCategory::Transport);
}

#[tokio::test]
async fn client_connects_through_configured_base_url() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(header("authorization", "Bearer or-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion_body("via router")))
        .expect(1)
        .mount(&server)
        .await;

    let config = ClientConfig::new(
        Credentials::for_endpoint(Endpoint::OpenRouter, Some("or-key".into()))
            .with_base_url(format!("{}/v1/", server.uri())),
        "moonshotai/kimi-k2:free",
    );
    let client = ChatClient::connect(&config).unwrap();

    let response = client.complete(vec![ChatMessage::user("hi")]).await.unwrap();
    assert_eq!(response.text, "via router");

    client.close().await.unwrap();
    client.close().await.unwrap();
    assert!(client.is_closed());
}

#[tokio::test]
async fn connect_without_key_fails_before_any_request() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion_body("unused")))
        .expect(0)
        .mount(&server)
        .await;

    let config = ClientConfig::new(
        Credentials::for_endpoint(Endpoint::OpenAi, Some("   ".into())).with_base_url(server.uri()),
        "gpt-4o-mini",
    );

    let err = ChatClient::connect(&config).unwrap_err();
    match err {
        ColloquyError::MissingCredential { env_var } => assert_eq!(env_var, "OPENAI_API_KEY"),
        other => panic!("expected missing credential, got {other:?}"),
    }
}
