//! Optional TOML settings file overriding runner defaults.
//!
//! ```toml
//! timeout_secs = 90
//! temperature = 0.2
//! max_tokens = 512
//!
//! [completion]
//! model = "moonshotai/kimi-k2:free"
//!
//! [group_chat]
//! max_round = 6
//! termination_token = "quit"
//!
//! [group_chat.code_execution]
//! work_dir = "coding"
//! last_n_messages = 2
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use serde::Deserialize;
use tracing::debug;

use super::{
    AssistantConfig, ClientConfig, CodeExecutionConfig, CompletionConfig, GroupChatConfig,
};
use crate::error::{ColloquyError, Result};

/// Parsed settings file. Every field is optional.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Settings {
    pub timeout_secs: Option<u64>,
    pub temperature: Option<f64>,
    pub max_tokens: Option<u32>,
    #[serde(default)]
    pub completion: CompletionSection,
    #[serde(default)]
    pub assistant: AssistantSection,
    #[serde(default)]
    pub group_chat: GroupChatSection,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct CompletionSection {
    pub model: Option<String>,
    pub base_url: Option<String>,
    pub system_message: Option<String>,
    pub user_message: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct AssistantSection {
    pub model: Option<String>,
    pub base_url: Option<String>,
    pub name: Option<String>,
    pub system_message: Option<String>,
    pub task: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct GroupChatSection {
    pub model: Option<String>,
    pub base_url: Option<String>,
    pub system_message: Option<String>,
    pub seed_message: Option<String>,
    pub max_round: Option<usize>,
    pub termination_token: Option<String>,
    pub code_execution: Option<CodeExecutionSection>,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct CodeExecutionSection {
    pub work_dir: PathBuf,
    pub last_n_messages: Option<usize>,
    pub timeout_secs: Option<u64>,
}

/// `<config dir>/colloquy/config.toml` for the current platform.
pub fn default_settings_path() -> Option<PathBuf> {
    ProjectDirs::from("", "", "colloquy").map(|dirs| dirs.config_dir().join("config.toml"))
}

impl Settings {
    pub fn parse(text: &str) -> Result<Self> {
        let settings: Settings = toml::from_str(text)?;
        if settings.group_chat.max_round == Some(0) {
            return Err(ColloquyError::Configuration(
                "group_chat.max_round must be at least 1".into(),
            ));
        }
        Ok(settings)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        debug!(path = %path.display(), "loaded settings file");
        Self::parse(&text)
    }

    /// Load `path` if given, else the default location if it exists.
    /// A missing default file yields empty settings.
    pub fn discover(path: Option<&Path>) -> Result<Self> {
        if let Some(path) = path {
            return Self::load(path);
        }
        match default_settings_path() {
            Some(path) if path.is_file() => Self::load(&path),
            _ => Ok(Self::default()),
        }
    }

    fn apply_client(&self, client: &mut ClientConfig, model: &Option<String>, base_url: &Option<String>) {
        if let Some(model) = model {
            client.model = model.clone();
        }
        if let Some(url) = base_url {
            client.credentials = client.credentials.clone().with_base_url(url.clone());
        }
        if let Some(secs) = self.timeout_secs {
            client.timeout = Some(Duration::from_secs(secs));
        }
        if let Some(temperature) = self.temperature {
            client.settings.temperature = Some(temperature);
        }
        if let Some(max_tokens) = self.max_tokens {
            client.settings.max_tokens = Some(max_tokens);
        }
    }

    pub fn apply_completion(&self, config: &mut CompletionConfig) {
        let section = &self.completion;
        self.apply_client(&mut config.client, &section.model, &section.base_url);
        if let Some(ref system) = section.system_message {
            config.system_message = system.clone();
        }
        if let Some(ref user) = section.user_message {
            config.user_message = user.clone();
        }
    }

    pub fn apply_assistant(&self, config: &mut AssistantConfig) {
        let section = &self.assistant;
        self.apply_client(&mut config.client, &section.model, &section.base_url);
        if let Some(ref name) = section.name {
            config.name = name.clone();
        }
        if let Some(ref system) = section.system_message {
            config.system_message = system.clone();
        }
        if let Some(ref task) = section.task {
            config.task = task.clone();
        }
    }

    pub fn apply_group_chat(&self, config: &mut GroupChatConfig) {
        let section = &self.group_chat;
        self.apply_client(&mut config.client, &section.model, &section.base_url);
        if let Some(ref system) = section.system_message {
            config.system_message = system.clone();
        }
        if let Some(ref seed) = section.seed_message {
            config.seed_message = seed.clone();
        }
        if let Some(max_round) = section.max_round {
            config.max_round = max_round;
        }
        if let Some(ref token) = section.termination_token {
            config.termination_token = token.clone();
        }
        if let Some(ref exec) = section.code_execution {
            let mut code = CodeExecutionConfig::builder()
                .work_dir(exec.work_dir.clone())
                .build();
            if let Some(n) = exec.last_n_messages {
                code.last_n_messages = n;
            }
            if let Some(secs) = exec.timeout_secs {
                code.timeout = Duration::from_secs(secs);
            }
            config.code_execution = Some(code);
        }
    }
}
