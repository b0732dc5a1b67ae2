//! Convenience re-exports for common use.

pub use crate::agent::{Agent, AgentReply, AssistantAgent, HumanProxyAgent, TerminationReason};
pub use crate::client::ChatClient;
pub use crate::config::{ClientConfig, Credentials};
pub use crate::error::{ColloquyError, Result};
pub use crate::provider::ModelProvider;
pub use crate::types::{ChatMessage, GenerationSettings, Role, Transcript, Usage};
