//! Shared test helpers and mock provider.
#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use colloquy::config::{ClientConfig, Credentials, Endpoint};
use colloquy::error::{ColloquyError, Result};
use colloquy::provider::{ModelProvider, ProviderRequest, ProviderResponse};
use colloquy::types::*;

/// A mock provider that returns canned responses and records every call.
///
/// Once the queue is empty it keeps answering with `"Mock response"`, so
/// agents backed by it are always willing to take another turn.
#[derive(Default)]
pub struct MockProvider {
    responses: Mutex<VecDeque<Result<ProviderResponse>>>,
    requests: Mutex<Vec<ProviderRequest>>,
    closes: AtomicUsize,
}

impl MockProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a text response.
    pub fn queue_response(&self, text: &str) {
        self.responses.lock().unwrap().push_back(Ok(ProviderResponse {
            text: text.to_string(),
            usage: Usage {
                input_tokens: 10,
                output_tokens: 20,
                total_tokens: 30,
            },
            finish_reason: Some(FinishReason::Stop),
        }));
    }

    /// Queue a failure.
    pub fn queue_error(&self, status: u16, message: &str) {
        self.responses
            .lock()
            .unwrap()
            .push_back(Err(ColloquyError::api(status, message)));
    }

    pub fn calls(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn closes(&self) -> usize {
        self.closes.load(Ordering::SeqCst)
    }

    pub fn requests(&self) -> Vec<ProviderRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn last_request(&self) -> Option<ProviderRequest> {
        self.requests.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl ModelProvider for MockProvider {
    fn provider_name(&self) -> &str {
        "mock"
    }

    async fn generate_text(&self, request: &ProviderRequest) -> Result<ProviderResponse> {
        self.requests.lock().unwrap().push(request.clone());
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(ProviderResponse::text("Mock response")))
    }

    async fn close(&self) -> Result<()> {
        self.closes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Client config with a key present.
pub fn client_config(model: &str) -> ClientConfig {
    ClientConfig::new(
        Credentials::for_endpoint(Endpoint::OpenAi, Some("sk-test".to_string())),
        model,
    )
}

/// Client config with no key.
pub fn keyless_client_config(model: &str) -> ClientConfig {
    ClientConfig::new(Credentials::for_endpoint(Endpoint::OpenAi, None), model)
}
