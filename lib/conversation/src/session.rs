//! Conversation sessions.
//!
//! A session holds the committed history for one key and the generation
//! settings it was created with. History only grows, and only by whole
//! round trips: a user turn is never stored without its reply.

use crate::turn::Turn;
use chrono::{DateTime, Utc};
use solace_ai::{GenerationConfig, LlmMessage};
use solace_core::SessionKey;
use std::sync::Arc;

/// A conversation session.
#[derive(Debug)]
pub struct Session {
    key: SessionKey,
    turns: Vec<Turn>,
    created_at: DateTime<Utc>,
    last_active_at: DateTime<Utc>,
    config: Arc<GenerationConfig>,
}

impl Session {
    /// Creates an empty session with a fixed configuration snapshot.
    #[must_use]
    pub fn new(key: SessionKey, config: GenerationConfig) -> Self {
        let now = Utc::now();
        Self {
            key,
            turns: Vec::new(),
            created_at: now,
            last_active_at: now,
            config: Arc::new(config),
        }
    }

    /// Returns the session key.
    #[must_use]
    pub fn key(&self) -> &SessionKey {
        &self.key
    }

    /// Returns the committed turns in order.
    #[must_use]
    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    /// Returns the number of committed turns.
    #[must_use]
    pub fn turn_count(&self) -> usize {
        self.turns.len()
    }

    /// When the session was created.
    #[must_use]
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// When a round trip was last committed.
    #[must_use]
    pub fn last_active_at(&self) -> DateTime<Utc> {
        self.last_active_at
    }

    /// Returns the configuration snapshot.
    #[must_use]
    pub fn config(&self) -> Arc<GenerationConfig> {
        Arc::clone(&self.config)
    }

    /// Returns the history in backend message form.
    #[must_use]
    pub fn history(&self) -> Vec<LlmMessage> {
        self.turns.iter().map(Turn::to_llm_message).collect()
    }

    /// Commits a completed round trip: the user turn, then the reply.
    pub fn commit_round_trip(&mut self, user_text: impl Into<String>, reply: impl Into<String>) {
        self.turns.push(Turn::user(user_text));
        self.turns.push(Turn::assistant(reply));
        self.last_active_at = Utc::now();
    }
}
