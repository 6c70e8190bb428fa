//! Turn types for conversation history.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use solace_ai::{LlmMessage, MessageRole};
use solace_core::TurnId;

/// One role-tagged message in a session's history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Turn {
    /// Unique turn identifier.
    pub id: TurnId,
    /// Who produced the turn.
    pub role: MessageRole,
    /// Turn text.
    pub text: String,
    /// When the turn was committed.
    pub timestamp: DateTime<Utc>,
}

impl Turn {
    /// Creates a new turn.
    #[must_use]
    pub fn new(role: MessageRole, text: impl Into<String>) -> Self {
        Self {
            id: TurnId::new(),
            role,
            text: text.into(),
            timestamp: Utc::now(),
        }
    }

    /// Creates a user turn.
    #[must_use]
    pub fn user(text: impl Into<String>) -> Self {
        Self::new(MessageRole::User, text)
    }

    /// Creates an assistant turn.
    #[must_use]
    pub fn assistant(text: impl Into<String>) -> Self {
        Self::new(MessageRole::Assistant, text)
    }

    /// Converts the turn into the message shape the backend expects.
    #[must_use]
    pub fn to_llm_message(&self) -> LlmMessage {
        LlmMessage {
            role: self.role,
            content: self.text.clone(),
        }
    }
}
