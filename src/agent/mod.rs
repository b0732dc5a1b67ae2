//! Agents: named participants that produce the next message of a transcript.
//!
//! Every participant implements [`Agent`]. The concrete variants are the
//! [`AssistantAgent`] (backed by a model client), the [`HumanProxyAgent`]
//! (backed by a line-based input source and an optional code executor), and
//! the [`GroupChatManager`] (which delegates each turn to a selected
//! speaker).

pub mod assistant;
pub mod code_exec;
pub mod group_chat;
pub mod human;
pub mod runner;

pub use assistant::{AssistantAgent, TaskResult};
pub use code_exec::{CodeBlock, CodeExecutor, ExecutionResult, LocalCodeExecutor};
pub use group_chat::{ChatResult, GroupChat, GroupChatManager, MessageSink};
pub use human::{HumanInput, HumanProxyAgent, ScriptedInput, StdinInput};
pub use runner::{run_group_chat, run_single_exchange, run_single_exchange_with};

use async_trait::async_trait;
use strum::Display;

use crate::error::Result;
use crate::types::{ChatMessage, Transcript};

/// Why a conversation stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "snake_case")]
pub enum TerminationReason {
    /// The round cap was reached.
    MaxRounds,
    /// The human entered the termination token.
    TerminationToken,
    /// The human's input source was exhausted.
    InputClosed,
}

/// What an agent does with its turn.
#[derive(Debug, Clone, PartialEq)]
pub enum AgentReply {
    Message(ChatMessage),
    Terminate(TerminationReason),
}

/// A named participant capable of producing a message given a transcript.
#[async_trait]
pub trait Agent: Send {
    fn name(&self) -> &str;

    /// Produce the next message, or signal termination.
    async fn produce_next_message(&mut self, transcript: &Transcript) -> Result<AgentReply>;
}
