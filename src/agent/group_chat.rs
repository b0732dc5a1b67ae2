//! Bounded group chat and the manager that drives turn-taking.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{info, Instrument};
use uuid::Uuid;

use crate::error::{ColloquyError, Result};
use crate::types::{ChatMessage, Transcript, Usage};

use super::{Agent, AgentReply, TerminationReason};

/// Observer called with every message appended to a group-chat transcript.
pub type MessageSink = Arc<dyn Fn(&ChatMessage) + Send + Sync>;

/// Participants plus the round cap.
pub struct GroupChat {
    agents: Vec<Box<dyn Agent>>,
    max_round: usize,
}

impl GroupChat {
    pub fn new(agents: Vec<Box<dyn Agent>>, max_round: usize) -> Result<Self> {
        if agents.is_empty() {
            return Err(ColloquyError::Configuration(
                "a group chat needs at least one agent".into(),
            ));
        }
        if max_round == 0 {
            return Err(ColloquyError::Configuration(
                "max_round must be at least 1".into(),
            ));
        }
        Ok(Self { agents, max_round })
    }

    pub fn max_round(&self) -> usize {
        self.max_round
    }

    pub fn agent_names(&self) -> Vec<&str> {
        self.agents.iter().map(|a| a.name()).collect()
    }

    fn index_of(&self, name: &str) -> Option<usize> {
        self.agents.iter().position(|a| a.name() == name)
    }
}

/// Outcome of a group chat.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatResult {
    pub session_id: Uuid,
    pub transcript: Transcript,
    /// Agent turns that produced a message (the seed is not counted).
    pub rounds: usize,
    pub termination: TerminationReason,
    /// Tokens spent by model-backed participants, when known.
    pub usage: Usage,
}

/// Drives a [`GroupChat`]: picks speakers round-robin and counts rounds.
///
/// The manager is itself an [`Agent`]: each call to
/// [`produce_next_message`](Agent::produce_next_message) runs one turn of
/// the selected speaker and returns its message, or
/// [`TerminationReason::MaxRounds`] once the cap is spent.
pub struct GroupChatManager {
    name: String,
    chat: GroupChat,
    next_speaker: usize,
    rounds: usize,
    session_id: Uuid,
    sink: Option<MessageSink>,
}

impl GroupChatManager {
    pub fn new(name: impl Into<String>, chat: GroupChat) -> Self {
        Self {
            name: name.into(),
            chat,
            next_speaker: 0,
            rounds: 0,
            session_id: Uuid::new_v4(),
            sink: None,
        }
    }

    pub fn with_message_sink(mut self, sink: MessageSink) -> Self {
        self.sink = Some(sink);
        self
    }

    fn emit(&self, message: &ChatMessage) {
        if let Some(ref sink) = self.sink {
            sink(message);
        }
    }

    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    pub fn rounds(&self) -> usize {
        self.rounds
    }

    fn select_speaker(&mut self) -> usize {
        let speaker = self.next_speaker;
        self.next_speaker = (speaker + 1) % self.chat.agents.len();
        speaker
    }

    /// Seed the chat with a message from `sender` and run until the round
    /// cap or a termination signal.
    pub async fn run(&mut self, sender: &str, seed: impl Into<String>) -> Result<ChatResult> {
        let sender_index = self.chat.index_of(sender).ok_or_else(|| {
            ColloquyError::Configuration(format!("'{sender}' is not a member of the group chat"))
        })?;
        self.next_speaker = (sender_index + 1) % self.chat.agents.len();
        self.rounds = 0;

        let seed = ChatMessage::user(seed).with_name(sender);
        self.emit(&seed);
        let mut transcript = Transcript::from(vec![seed]);

        let span = tracing::info_span!("group_chat", session = %self.session_id);
        let termination = async {
            loop {
                match self.produce_next_message(&transcript).await? {
                    AgentReply::Message(message) => {
                        self.emit(&message);
                        transcript.push(message);
                    }
                    AgentReply::Terminate(reason) => break Ok::<_, ColloquyError>(reason),
                }
            }
        }
        .instrument(span)
        .await?;

        info!(
            session = %self.session_id,
            rounds = self.rounds,
            reason = %termination,
            "group chat finished"
        );
        Ok(ChatResult {
            session_id: self.session_id,
            transcript,
            rounds: self.rounds,
            termination,
            usage: Usage::default(),
        })
    }
}

#[async_trait]
impl Agent for GroupChatManager {
    fn name(&self) -> &str {
        &self.name
    }

    async fn produce_next_message(&mut self, transcript: &Transcript) -> Result<AgentReply> {
        if self.rounds >= self.chat.max_round {
            return Ok(AgentReply::Terminate(TerminationReason::MaxRounds));
        }
        let index = self.select_speaker();
        let speaker = &mut self.chat.agents[index];
        info!(round = self.rounds + 1, speaker = speaker.name(), "next speaker");

        let reply = speaker.produce_next_message(transcript).await?;
        if let AgentReply::Message(_) = reply {
            self.rounds += 1;
        }
        Ok(reply)
    }
}
