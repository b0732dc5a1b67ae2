//! Human proxy agent and its input sources.

use std::collections::VecDeque;
use std::io::Write;

use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
use tracing::{debug, info};

use crate::error::Result;
use crate::types::{ChatMessage, Transcript};

use super::code_exec::{collect_code_blocks, CodeExecutor};
use super::{Agent, AgentReply, TerminationReason};

/// Reply sent when the human skips and there is nothing to execute.
pub const NO_CODE_REPLY: &str = "No code blocks to execute. Please continue.";

/// A line-oriented source of human input.
#[async_trait]
pub trait HumanInput: Send {
    /// Show `prompt` and read one line. `None` once input is exhausted.
    async fn read_line(&mut self, prompt: &str) -> Result<Option<String>>;
}

/// Reads from the process's standard input.
pub struct StdinInput {
    lines: Lines<BufReader<Stdin>>,
}

impl StdinInput {
    pub fn new() -> Self {
        Self {
            lines: BufReader::new(tokio::io::stdin()).lines(),
        }
    }
}

impl Default for StdinInput {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl HumanInput for StdinInput {
    async fn read_line(&mut self, prompt: &str) -> Result<Option<String>> {
        let mut stdout = std::io::stdout();
        write!(stdout, "{prompt}")?;
        stdout.flush()?;
        Ok(self.lines.next_line().await?)
    }
}

/// Replays a fixed list of lines, then reports end of input.
#[derive(Debug, Clone, Default)]
pub struct ScriptedInput {
    lines: VecDeque<String>,
    prompts: Vec<String>,
}

impl ScriptedInput {
    pub fn new<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            lines: lines.into_iter().map(Into::into).collect(),
            prompts: Vec::new(),
        }
    }

    /// Prompts shown so far.
    pub fn prompts(&self) -> &[String] {
        &self.prompts
    }
}

#[async_trait]
impl HumanInput for ScriptedInput {
    async fn read_line(&mut self, prompt: &str) -> Result<Option<String>> {
        self.prompts.push(prompt.to_string());
        Ok(self.lines.pop_front())
    }
}

struct Execution {
    executor: Box<dyn CodeExecutor>,
    last_n_messages: usize,
}

/// Stands in for the human: relays typed input, ends the chat on the
/// termination token, and on an empty line runs code from recent messages.
pub struct HumanProxyAgent {
    name: String,
    input: Box<dyn HumanInput>,
    termination_token: String,
    execution: Option<Execution>,
}

impl HumanProxyAgent {
    pub fn new(
        name: impl Into<String>,
        input: Box<dyn HumanInput>,
        termination_token: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            input,
            termination_token: termination_token.into(),
            execution: None,
        }
    }

    pub fn with_code_executor(mut self, executor: Box<dyn CodeExecutor>, last_n_messages: usize) -> Self {
        self.execution = Some(Execution {
            executor,
            last_n_messages,
        });
        self
    }

    fn prompt(&self, transcript: &Transcript) -> String {
        let last_speaker = transcript
            .last()
            .and_then(|m| m.name.as_deref())
            .unwrap_or("the chat");
        format!(
            "Provide feedback to {last_speaker}. Press enter to skip and use auto-reply, or type '{}' to end the conversation: ",
            self.termination_token
        )
    }
}

/// Reply for an empty line: run code blocks from the trailing messages.
async fn auto_reply(
    agent: &str,
    execution: Option<&Execution>,
    transcript: &Transcript,
) -> Result<String> {
    let Some(execution) = execution else {
        return Ok(NO_CODE_REPLY.to_string());
    };
    let blocks = collect_code_blocks(transcript.last_n(execution.last_n_messages));
    if blocks.is_empty() {
        return Ok(NO_CODE_REPLY.to_string());
    }
    info!(agent, blocks = blocks.len(), "executing code blocks");
    let result = execution.executor.execute(&blocks).await?;
    Ok(result.report())
}

#[async_trait]
impl Agent for HumanProxyAgent {
    fn name(&self) -> &str {
        &self.name
    }

    async fn produce_next_message(&mut self, transcript: &Transcript) -> Result<AgentReply> {
        let prompt = self.prompt(transcript);
        let Some(line) = self.input.read_line(&prompt).await? else {
            debug!(agent = %self.name, "human input closed");
            return Ok(AgentReply::Terminate(TerminationReason::InputClosed));
        };

        let line = line.trim();
        if line == self.termination_token {
            return Ok(AgentReply::Terminate(TerminationReason::TerminationToken));
        }

        let content = if line.is_empty() {
            auto_reply(&self.name, self.execution.as_ref(), transcript).await?
        } else {
            line.to_string()
        };
        Ok(AgentReply::Message(
            ChatMessage::user(content).with_name(self.name.clone()),
        ))
    }
}
