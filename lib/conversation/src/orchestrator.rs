//! Conversation orchestrator.
//!
//! Handles one inbound message:
//! 1. Reject a missing or blank message without touching any session
//! 2. Classify the message for crisis language
//! 3. On a crisis, answer with the resource reply; the message is neither
//!    sent to the model nor stored
//! 4. Otherwise get or create the session, call the model with its
//!    history, and commit the user turn and reply only if the call
//!    succeeds within the timeout
//!
//! Step 3 has no dependency on the model or the session store.

use crate::error::{ConversationError, SessionError};
use crate::registry::SessionRegistry;
use crate::response::{Outcome, ResponseEnvelope, ResponsePolicy};
use solace_ai::{ChatBackend, GenerationConfig};
use solace_core::SessionKey;
use solace_triage::CrisisClassifier;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, instrument, warn};

/// Default bound on a single model call.
pub const DEFAULT_MODEL_TIMEOUT: Duration = Duration::from_secs(30);

/// Composes triage, session storage and the model backend.
pub struct ConversationOrchestrator {
    classifier: Arc<CrisisClassifier>,
    registry: Arc<dyn SessionRegistry>,
    backend: Arc<dyn ChatBackend>,
    policy: ResponsePolicy,
    default_config: GenerationConfig,
    model_timeout: Duration,
}

impl ConversationOrchestrator {
    /// Creates an orchestrator with the default policy, generation config
    /// and model timeout.
    #[must_use]
    pub fn new(
        classifier: Arc<CrisisClassifier>,
        registry: Arc<dyn SessionRegistry>,
        backend: Arc<dyn ChatBackend>,
    ) -> Self {
        Self {
            classifier,
            registry,
            backend,
            policy: ResponsePolicy::default(),
            default_config: GenerationConfig::default(),
            model_timeout: DEFAULT_MODEL_TIMEOUT,
        }
    }

    /// Sets the response policy.
    #[must_use]
    pub fn with_policy(mut self, policy: ResponsePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Sets the configuration new sessions are created with.
    #[must_use]
    pub fn with_default_config(mut self, config: GenerationConfig) -> Self {
        self.default_config = config;
        self
    }

    /// Sets the bound on a single model call.
    #[must_use]
    pub fn with_model_timeout(mut self, timeout: Duration) -> Self {
        self.model_timeout = timeout;
        self
    }

    /// Handles one inbound message.
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` if the message is empty or whitespace. Model
    /// and store failures are not errors; they produce a fallback envelope.
    #[instrument(skip(self, key, raw_message), fields(session_key = %key))]
    pub async fn handle_message(
        &self,
        key: &SessionKey,
        raw_message: &str,
    ) -> Result<ResponseEnvelope, ConversationError> {
        if raw_message.trim().is_empty() {
            return Err(ConversationError::message_required());
        }

        let classification = self.classifier.classify(raw_message);
        let outcome = if classification.is_crisis {
            // The text itself is never logged or stored.
            warn!(
                matched_rule = classification.matched_rule.as_deref().unwrap_or("unknown"),
                "Crisis language detected; model bypassed"
            );
            Outcome::Crisis {
                matched_rule: classification.matched_rule,
            }
        } else {
            self.converse(key, raw_message).await
        };

        Ok(self.policy.envelope(outcome))
    }

    /// Runs one round trip against the model under the session lock.
    async fn converse(&self, key: &SessionKey, message: &str) -> Outcome {
        let session = match self.registry.get_or_create(key, &self.default_config).await {
            Ok(session) => session,
            Err(report) => {
                error!(error = %report, "Session store unavailable");
                return Outcome::Unavailable;
            }
        };

        let mut session = session.lock().await;
        let history = session.history();
        let config = session.config();

        let call = self.backend.send_message(&history, message, &config);
        let reply = match tokio::time::timeout(self.model_timeout, call).await {
            Ok(Ok(reply)) => reply,
            Ok(Err(report)) => {
                warn!(
                    provider = self.backend.provider(),
                    error = %report,
                    "Model call failed; history left unchanged"
                );
                return Outcome::Unavailable;
            }
            Err(_) => {
                warn!(
                    provider = self.backend.provider(),
                    timeout = ?self.model_timeout,
                    "Model call timed out; history left unchanged"
                );
                return Outcome::Unavailable;
            }
        };

        let reply = self.policy.assistant_text(reply);
        session.commit_round_trip(message, reply.clone());
        info!(turns = session.turn_count(), "Round trip committed");

        Outcome::Replied { text: reply }
    }

    /// Deletes the session for `key`. Deleting an absent session succeeds.
    ///
    /// # Errors
    ///
    /// Returns an error only if the session store fails.
    #[instrument(skip(self), fields(session_key = %key))]
    pub async fn clear_session(&self, key: &SessionKey) -> solace_core::Result<(), SessionError> {
        let removed = self.registry.delete(key).await?;
        info!(removed, "Session cleared");
        Ok(())
    }

    /// Returns the number of live sessions.
    ///
    /// # Errors
    ///
    /// Returns an error only if the session store fails.
    pub async fn active_sessions(&self) -> solace_core::Result<usize, SessionError> {
        self.registry.count().await
    }
}
