//! UI-agnostic conversation state
//!
//! The message log and token counter for one conversation. Everything here is
//! plain data: the TUI renders it and the session mutates it, but neither
//! depends on the other.

use serde::{Deserialize, Serialize};

/// A chat message in the conversation log
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self { role: ChatRole::System, content: content.into() }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self { role: ChatRole::User, content: content.into() }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self { role: ChatRole::Assistant, content: content.into() }
    }
}

/// The role of a chat message sender
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    System,
    User,
    Assistant,
}

/// Ordered message log plus the running count of provider-reported tokens.
///
/// After every completed turn the log has even length: a user message followed
/// by the assistant reply or a synthetic system error.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationState {
    pub messages: Vec<ChatMessage>,
    pub total_tokens: u64,
}

impl ConversationState {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn append(&mut self, message: ChatMessage) {
        self.messages.push(message);
    }

    /// Append one user message and its reply together and add the tokens the
    /// provider charged for the exchange.
    pub fn push_turn(&mut self, user: ChatMessage, reply: ChatMessage, usage_tokens: u64) {
        self.messages.reserve(2);
        self.messages.push(user);
        self.messages.push(reply);
        self.total_tokens = self.total_tokens.saturating_add(usage_tokens);
    }

    pub fn reset(&mut self) {
        *self = Self::empty();
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}
