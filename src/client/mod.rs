//! Model client: credentials, a provider, and a release lifecycle.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use tracing::{debug, warn};

use crate::config::ClientConfig;
use crate::error::{ColloquyError, Result};
use crate::provider::{ModelProvider, ProviderRequest, ProviderResponse};
use crate::types::{ChatMessage, GenerationSettings, Usage};

/// A model client bound to one model on one endpoint.
///
/// Clones share the provider and the release state, so closing any clone
/// closes them all. [`close`](Self::close) is idempotent: the provider's
/// release hook runs exactly once no matter how often it is called.
/// Token usage is accumulated across every completion made by any clone.
#[derive(Clone)]
pub struct ChatClient {
    provider: Arc<dyn ModelProvider>,
    model: String,
    settings: GenerationSettings,
    usage: Arc<Mutex<Usage>>,
    closed: Arc<AtomicBool>,
}

impl fmt::Debug for ChatClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChatClient")
            .field("provider", &self.provider.provider_name())
            .field("model", &self.model)
            .field("closed", &self.is_closed())
            .finish()
    }
}

impl ChatClient {
    /// Build a client talking to the configured OpenAI-compatible endpoint.
    #[cfg(feature = "openai")]
    pub fn connect(config: &ClientConfig) -> Result<Self> {
        let provider = crate::provider::openai::OpenAiProvider::from_config(config)?;
        Self::with_provider(config, Arc::new(provider))
    }

    /// Build a client over an explicit provider.
    ///
    /// The credential is still checked here so a missing key fails before
    /// the provider sees any request.
    pub fn with_provider(config: &ClientConfig, provider: Arc<dyn ModelProvider>) -> Result<Self> {
        config.credentials.require_api_key()?;
        Ok(Self {
            provider,
            model: config.model.clone(),
            settings: config.settings.clone(),
            usage: Arc::new(Mutex::new(Usage::default())),
            closed: Arc::new(AtomicBool::new(false)),
        })
    }

    pub fn settings(&self) -> &GenerationSettings {
        &self.settings
    }

    /// Total usage of every completion made so far.
    pub fn usage(&self) -> Usage {
        *self.usage.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    /// Send `messages` and return the first completion. One provider call,
    /// no retry.
    pub async fn complete(&self, messages: Vec<ChatMessage>) -> Result<ProviderResponse> {
        if self.is_closed() {
            return Err(ColloquyError::InvalidState("model client is closed".into()));
        }
        let request = ProviderRequest {
            model: self.model.clone(),
            messages,
            settings: self.settings.clone(),
        };
        let response = self.provider.generate_text(&request).await?;
        self.usage
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .merge(&response.usage);
        Ok(response)
    }

    /// Release the provider. Later calls are no-ops.
    pub async fn close(&self) -> Result<()> {
        if self.closed.swap(true, Ordering::AcqRel) {
            debug!(model = %self.model, "model client already closed");
            return Ok(());
        }
        debug!(model = %self.model, "closing model client");
        if let Err(e) = self.provider.close().await {
            warn!(error = %e, "provider release failed");
            return Err(e);
        }
        Ok(())
    }
}
