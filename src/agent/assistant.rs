//! Assistant agent backed by a model client.

use std::fmt;

use async_trait::async_trait;
use tracing::debug;

use crate::client::ChatClient;
use crate::error::Result;
use crate::types::{ChatMessage, FinishReason, Role, Transcript, Usage};

use super::{Agent, AgentReply};

/// Speaker name given to a task issued directly to an assistant.
pub const TASK_SENDER: &str = "user";

/// An agent that answers by asking the model for one completion.
#[derive(Debug, Clone)]
pub struct AssistantAgent {
    name: String,
    system_message: String,
    client: ChatClient,
}

/// Outcome of [`AssistantAgent::run`].
#[derive(Debug, Clone, PartialEq)]
pub struct TaskResult {
    pub transcript: Transcript,
    pub usage: Usage,
    pub finish_reason: Option<FinishReason>,
}

impl TaskResult {
    /// Text of the assistant's reply.
    pub fn reply(&self) -> Option<&str> {
        self.transcript
            .last()
            .filter(|m| m.role == Role::Assistant)
            .map(|m| m.content.as_str())
    }
}

impl fmt::Display for TaskResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.transcript)?;
        match self.finish_reason {
            Some(reason) => write!(f, "finish_reason: {reason}"),
            None => write!(f, "finish_reason: unknown"),
        }
    }
}

impl AssistantAgent {
    pub fn new(name: impl Into<String>, system_message: impl Into<String>, client: ChatClient) -> Self {
        Self {
            name: name.into(),
            system_message: system_message.into(),
            client,
        }
    }

    pub fn system_message(&self) -> &str {
        &self.system_message
    }

    /// The request as seen from this agent: its own prior messages are
    /// `assistant`, everyone else's are `user`.
    pub fn build_messages(&self, transcript: &Transcript) -> Vec<ChatMessage> {
        let mut messages = Vec::with_capacity(transcript.len() + 1);
        messages.push(ChatMessage::system(self.system_message.clone()));
        for msg in transcript.messages() {
            let role = match msg.role {
                Role::System => Role::System,
                _ if msg.is_from(&self.name) => Role::Assistant,
                _ => Role::User,
            };
            let mut mapped = msg.clone();
            mapped.role = role;
            messages.push(mapped);
        }
        messages
    }

    async fn respond(&self, transcript: &Transcript) -> Result<(ChatMessage, Usage, Option<FinishReason>)> {
        let response = self.client.complete(self.build_messages(transcript)).await?;
        debug!(agent = %self.name, chars = response.text.len(), "assistant replied");
        let message = ChatMessage::assistant(response.text).with_name(self.name.clone());
        Ok((message, response.usage, response.finish_reason))
    }

    /// Issue one task and await one reply.
    pub async fn run(&self, task: impl Into<String>) -> Result<TaskResult> {
        let mut transcript = Transcript::new();
        transcript.push(ChatMessage::user(task).with_name(TASK_SENDER));
        let (reply, usage, finish_reason) = self.respond(&transcript).await?;
        transcript.push(reply);
        Ok(TaskResult {
            transcript,
            usage,
            finish_reason,
        })
    }
}

#[async_trait]
impl Agent for AssistantAgent {
    fn name(&self) -> &str {
        &self.name
    }

    async fn produce_next_message(&mut self, transcript: &Transcript) -> Result<AgentReply> {
        let (message, _, _) = self.respond(transcript).await?;
        Ok(AgentReply::Message(message))
    }
}
