//! Model provider trait and implementations.
//!
//! A provider is the transport seam: it turns one [`ProviderRequest`] into
//! exactly one remote call. It never retries.

pub mod http;

#[cfg(feature = "openai")]
pub mod openai;

use async_trait::async_trait;

use crate::error::Result;
use crate::types::{ChatMessage, FinishReason, GenerationSettings, Usage};

/// A request sent to a model provider.
#[derive(Debug, Clone, PartialEq)]
pub struct ProviderRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub settings: GenerationSettings,
}

/// The first completion returned by a provider.
#[derive(Debug, Clone, PartialEq)]
pub struct ProviderResponse {
    pub text: String,
    pub usage: Usage,
    pub finish_reason: Option<FinishReason>,
}

impl ProviderResponse {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            usage: Usage::default(),
            finish_reason: Some(FinishReason::Stop),
        }
    }
}

/// Core trait implemented by all model providers.
#[async_trait]
pub trait ModelProvider: Send + Sync {
    /// Provider name (e.g., "openai").
    fn provider_name(&self) -> &str;

    /// Perform one completion request.
    async fn generate_text(&self, request: &ProviderRequest) -> Result<ProviderResponse>;

    /// Release held resources. The owning client calls this at most once.
    async fn close(&self) -> Result<()> {
        Ok(())
    }
}
