//! Explicit configuration passed into every entry point.
//!
//! Nothing in the library reads process environment directly. The binary
//! populates these structs once at start-up through [`env`] and, optionally,
//! a TOML settings file through [`file`].

pub mod env;
pub mod file;

pub use env::EnvLoader;
pub use file::Settings;

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use bon::Builder;

use crate::error::{ColloquyError, Result};
use crate::types::{ChatMessage, GenerationSettings};

/// Chat-completion endpoints the loader knows how to configure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display, strum::EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum Endpoint {
    OpenAi,
    OpenRouter,
}

impl Endpoint {
    pub fn default_base_url(self) -> &'static str {
        match self {
            Self::OpenAi => "https://api.openai.com/v1",
            Self::OpenRouter => "https://openrouter.ai/api/v1",
        }
    }

    pub fn api_key_var(self) -> &'static str {
        match self {
            Self::OpenAi => "OPENAI_API_KEY",
            Self::OpenRouter => "OPENROUTER_API_KEY",
        }
    }

    pub fn base_url_var(self) -> &'static str {
        match self {
            Self::OpenAi => "OPENAI_BASE_URL",
            Self::OpenRouter => "OPENROUTER_BASE_URL",
        }
    }
}

/// API key plus the endpoint it is valid for.
#[derive(Clone)]
pub struct Credentials {
    api_key: Option<String>,
    base_url: String,
    /// Where the key was expected to come from, for error messages.
    key_source: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("api_key", &self.api_key.as_ref().map(|_| ".."))
            .field("base_url", &self.base_url)
            .field("key_source", &self.key_source)
            .finish()
    }
}

impl Credentials {
    pub fn new(api_key: Option<String>, base_url: impl Into<String>) -> Self {
        Self {
            api_key,
            base_url: base_url.into(),
            key_source: "api key".to_string(),
        }
    }

    /// Credentials for a known endpoint with its default base URL.
    pub fn for_endpoint(endpoint: Endpoint, api_key: Option<String>) -> Self {
        Self {
            api_key,
            base_url: endpoint.default_base_url().to_string(),
            key_source: endpoint.api_key_var().to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_key_source(mut self, key_source: impl Into<String>) -> Self {
        self.key_source = key_source.into();
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// The API key, or a configuration error if it is absent or blank.
    pub fn require_api_key(&self) -> Result<&str> {
        match self.api_key.as_deref() {
            Some(key) if !key.trim().is_empty() => Ok(key),
            _ => Err(ColloquyError::missing_credential(&self.key_source)),
        }
    }
}

/// Everything needed to build a model client.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub credentials: Credentials,
    pub model: String,
    /// Per-request timeout. `None` waits indefinitely.
    pub timeout: Option<Duration>,
    /// Sampling options sent with every request.
    pub settings: GenerationSettings,
}

impl ClientConfig {
    pub fn new(credentials: Credentials, model: impl Into<String>) -> Self {
        Self {
            credentials,
            model: model.into(),
            timeout: None,
            settings: GenerationSettings::default(),
        }
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_settings(mut self, settings: GenerationSettings) -> Self {
        self.settings = settings;
        self
    }
}

pub const DEFAULT_COMPLETION_MODEL: &str = "moonshotai/kimi-k2:free";
pub const DEFAULT_COMPLETION_SYSTEM: &str = "You are a helpful AI assistant.";
pub const DEFAULT_COMPLETION_PROMPT: &str =
    "Explain the concept of quantum entanglement in simple terms.";

/// Inputs of the single-turn completion runner.
#[derive(Debug, Clone)]
pub struct CompletionConfig {
    pub client: ClientConfig,
    pub system_message: String,
    pub user_message: String,
}

impl CompletionConfig {
    pub fn new(client: ClientConfig) -> Self {
        Self {
            client,
            system_message: DEFAULT_COMPLETION_SYSTEM.to_string(),
            user_message: DEFAULT_COMPLETION_PROMPT.to_string(),
        }
    }

    /// The ordered system + user pair sent to the model.
    pub fn messages(&self) -> Vec<ChatMessage> {
        vec![
            ChatMessage::system(self.system_message.clone()),
            ChatMessage::user(self.user_message.clone()),
        ]
    }
}

pub const DEFAULT_ASSISTANT_MODEL: &str = "gpt-3.5-turbo";
pub const DEFAULT_ASSISTANT_NAME: &str = "Assistant";
pub const DEFAULT_ASSISTANT_SYSTEM: &str = "You are a helpful AI assistant. You can help with various tasks including writing code, answering questions, and providing explanations.";
pub const DEFAULT_ASSISTANT_TASK: &str =
    "Hello! I'm ready to start our conversation. What would you like to work on today?";

/// Inputs of the single-exchange assistant runner.
#[derive(Debug, Clone)]
pub struct AssistantConfig {
    pub client: ClientConfig,
    pub name: String,
    pub system_message: String,
    pub task: String,
}

impl AssistantConfig {
    pub fn new(client: ClientConfig) -> Self {
        Self {
            client,
            name: DEFAULT_ASSISTANT_NAME.to_string(),
            system_message: DEFAULT_ASSISTANT_SYSTEM.to_string(),
            task: DEFAULT_ASSISTANT_TASK.to_string(),
        }
    }
}

pub const DEFAULT_MAX_ROUND: usize = 10;
pub const DEFAULT_TERMINATION_TOKEN: &str = "exit";
pub const DEFAULT_HUMAN_NAME: &str = "user_proxy";
pub const DEFAULT_SEED_MESSAGE: &str =
    "Write a short Python script that prints the first ten Fibonacci numbers.";

/// Code execution settings of the human proxy.
#[derive(Debug, Clone, Builder, PartialEq)]
pub struct CodeExecutionConfig {
    #[builder(into)]
    pub work_dir: PathBuf,
    /// How many trailing messages are scanned for code blocks.
    #[builder(default = 3)]
    pub last_n_messages: usize,
    #[builder(default = Duration::from_secs(60))]
    pub timeout: Duration,
}

/// Inputs of the bounded group-chat runner.
#[derive(Debug, Clone)]
pub struct GroupChatConfig {
    pub client: ClientConfig,
    pub human_name: String,
    pub assistant_name: String,
    pub system_message: String,
    pub seed_message: String,
    pub max_round: usize,
    pub termination_token: String,
    pub code_execution: Option<CodeExecutionConfig>,
}

impl GroupChatConfig {
    pub fn new(client: ClientConfig) -> Self {
        Self {
            client,
            human_name: DEFAULT_HUMAN_NAME.to_string(),
            assistant_name: DEFAULT_ASSISTANT_NAME.to_string(),
            system_message: DEFAULT_ASSISTANT_SYSTEM.to_string(),
            seed_message: DEFAULT_SEED_MESSAGE.to_string(),
            max_round: DEFAULT_MAX_ROUND,
            termination_token: DEFAULT_TERMINATION_TOKEN.to_string(),
            code_execution: None,
        }
    }

    pub fn with_code_execution(mut self, code_execution: CodeExecutionConfig) -> Self {
        self.code_execution = Some(code_execution);
        self
    }
}
