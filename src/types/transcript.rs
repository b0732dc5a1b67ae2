//! Ordered, append-only conversation history.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::message::ChatMessage;

/// The ordered sequence of messages exchanged so far.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(transparent)]
pub struct Transcript {
    messages: Vec<ChatMessage>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, message: ChatMessage) {
        self.messages.push(message);
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn last(&self) -> Option<&ChatMessage> {
        self.messages.last()
    }

    /// The trailing `n` messages, oldest first.
    pub fn last_n(&self, n: usize) -> &[ChatMessage] {
        let start = self.messages.len().saturating_sub(n);
        &self.messages[start..]
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn into_messages(self) -> Vec<ChatMessage> {
        self.messages
    }
}

impl From<Vec<ChatMessage>> for Transcript {
    fn from(messages: Vec<ChatMessage>) -> Self {
        Self { messages }
    }
}

impl fmt::Display for Transcript {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for msg in &self.messages {
            let speaker = msg.name.as_deref().unwrap_or("");
            if speaker.is_empty() {
                writeln!(f, "[{}]", msg.role)?;
            } else {
                writeln!(f, "[{}] {speaker}", msg.role)?;
            }
            writeln!(f, "{}", msg.content)?;
            writeln!(f)?;
        }
        Ok(())
    }
}
