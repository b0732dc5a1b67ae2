//! Single-turn completion runner tests.

mod common;

use std::sync::Arc;

use colloquy::client::ChatClient;
use colloquy::completion::complete_and_print;
use colloquy::config::CompletionConfig;
use colloquy::error::{ColloquyError, ErrorCategory};
use colloquy::types::{ChatMessage, Role};
use common::{client_config, keyless_client_config, MockProvider};

#[tokio::test]
async fn prints_exactly_the_response_text() {
    let provider = Arc::new(MockProvider::new());
    provider.queue_response("hello back");
    let client = ChatClient::with_provider(&client_config("gpt-4o-mini"), provider.clone()).unwrap();

    let mut out = Vec::new();
    let text = complete_and_print(&client, vec![ChatMessage::user("hi")], &mut out)
        .await
        .unwrap();

    assert_eq!(text, "hello back");
    assert_eq!(String::from_utf8(out).unwrap(), "hello back\n");
    assert_eq!(provider.calls(), 1);

    let request = provider.last_request().unwrap();
    assert_eq!(request.model, "gpt-4o-mini");
    assert_eq!(request.messages.len(), 1);
    assert_eq!(request.messages[0].role, Role::User);
    assert_eq!(request.messages[0].content, "hi");
}

#[tokio::test]
async fn sends_system_then_user_in_order() {
    let provider = Arc::new(MockProvider::new());
    provider.queue_response("entanglement, simply");
    let config = CompletionConfig::new(client_config("moonshotai/kimi-k2:free"));
    let client = ChatClient::with_provider(&config.client, provider.clone()).unwrap();

    let mut out = Vec::new();
    complete_and_print(&client, config.messages(), &mut out).await.unwrap();

    let roles: Vec<Role> = provider
        .last_request()
        .unwrap()
        .messages
        .iter()
        .map(|m| m.role)
        .collect();
    assert_eq!(roles, [Role::System, Role::User]);
}

#[tokio::test]
async fn missing_credential_fails_before_any_call() {
    let provider = Arc::new(MockProvider::new());
    provider.queue_response("never sent");

    let err = ChatClient::with_provider(&keyless_client_config("gpt-4o-mini"), provider.clone())
        .unwrap_err();

    assert!(matches!(err, ColloquyError::MissingCredential { .. }));
    assert_eq!(err.category(), ErrorCategory::Configuration);
    assert_eq!(provider.calls(), 0);
}

#[tokio::test]
async fn remote_failure_propagates_and_prints_nothing() {
    let provider = Arc::new(MockProvider::new());
    provider.queue_error(404, "model not found");
    let client = ChatClient::with_provider(&client_config("gpt-99"), provider.clone()).unwrap();

    let mut out = Vec::new();
    let err = complete_and_print(&client, vec![ChatMessage::user("hi")], &mut out)
        .await
        .unwrap_err();

    assert_eq!(err.category(), ErrorCategory::Remote);
    assert!(out.is_empty());
    assert_eq!(provider.calls(), 1);
}
