//! Response policy.
//!
//! Every orchestrator outcome becomes a `ResponseEnvelope` whose `reply`
//! is readable text. Diagnostic detail travels in `error` and never
//! replaces the reply.

use crate::error::ConversationError;
use serde::{Deserialize, Serialize};

/// Reply for messages flagged by the crisis classifier.
pub const CRISIS_REPLY: &str = "\
I hear that you're in a lot of pain right now, and I'm really concerned about your safety. Please reach out to one of these resources immediately - they have trained counselors available 24/7 who can provide the support you need:

**If you're in immediate danger, please call emergency services (911 in US) or go to your nearest emergency room.**

**Crisis Helplines:**
- National Suicide Prevention Lifeline: 988 (US)
- Crisis Text Line: Text HOME to 741741 (US)
- International Association for Suicide Prevention: https://www.iasp.info/resources/Crisis_Centres/

You don't have to face this alone. These feelings can be overwhelming, but help is available and things can get better.";

/// Reply when the model cannot answer.
pub const UNAVAILABLE_REPLY: &str = "I apologize, but I'm having trouble responding right now. If you're in distress and need immediate support, please reach out to a crisis helpline or mental health professional. I'll be here when you're ready to try again.";

/// Reply used when the model answers with no text.
pub const LISTENING_PROMPT: &str = "I'm here and I'm listening. Could you tell me a bit more about what you're experiencing right now?";

/// Diagnostic message attached to failed envelopes.
pub const UNAVAILABLE_ERROR: &str = "An error occurred. Please try again.";

/// What the orchestrator decided for one message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The message was flagged; the model was not called.
    Crisis {
        /// The rule that flagged the message.
        matched_rule: Option<String>,
    },
    /// The model replied and the round trip was committed.
    Replied {
        /// The assistant text.
        text: String,
    },
    /// The model or session store failed; nothing was committed.
    Unavailable,
}

/// The uniform response shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseEnvelope {
    /// Whether the crisis path was taken.
    pub is_crisis: bool,
    /// Human-readable reply. Never empty.
    pub reply: String,
    /// Safe diagnostic message, present only on failure.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ResponseEnvelope {
    /// Returns true if the envelope reports a failure.
    #[must_use]
    pub fn is_failure(&self) -> bool {
        self.error.is_some()
    }
}

/// Maps outcomes to envelopes.
#[derive(Debug, Clone)]
pub struct ResponsePolicy {
    crisis_reply: String,
    unavailable_reply: String,
    listening_prompt: String,
}

impl ResponsePolicy {
    /// Creates a policy with custom texts.
    ///
    /// # Errors
    ///
    /// Returns `InvalidPolicy` if any text is blank.
    pub fn new(
        crisis_reply: impl Into<String>,
        unavailable_reply: impl Into<String>,
        listening_prompt: impl Into<String>,
    ) -> Result<Self, ConversationError> {
        let policy = Self {
            crisis_reply: crisis_reply.into(),
            unavailable_reply: unavailable_reply.into(),
            listening_prompt: listening_prompt.into(),
        };

        for (field, text) in [
            ("crisis_reply", &policy.crisis_reply),
            ("unavailable_reply", &policy.unavailable_reply),
            ("listening_prompt", &policy.listening_prompt),
        ] {
            if text.trim().is_empty() {
                return Err(ConversationError::InvalidPolicy { field });
            }
        }

        Ok(policy)
    }

    /// Returns the text to commit for a model reply.
    ///
    /// A blank reply becomes the listening prompt, so history mirrors what
    /// the user was shown.
    #[must_use]
    pub fn assistant_text(&self, reply: String) -> String {
        if reply.trim().is_empty() {
            self.listening_prompt.clone()
        } else {
            reply
        }
    }

    /// Builds the envelope for an outcome.
    #[must_use]
    pub fn envelope(&self, outcome: Outcome) -> ResponseEnvelope {
        match outcome {
            Outcome::Crisis { .. } => ResponseEnvelope {
                is_crisis: true,
                reply: self.crisis_reply.clone(),
                error: None,
            },
            Outcome::Replied { text } => ResponseEnvelope {
                is_crisis: false,
                reply: self.assistant_text(text),
                error: None,
            },
            Outcome::Unavailable => ResponseEnvelope {
                is_crisis: false,
                reply: self.unavailable_reply.clone(),
                error: Some(UNAVAILABLE_ERROR.to_string()),
            },
        }
    }
}

impl Default for ResponsePolicy {
    fn default() -> Self {
        Self {
            crisis_reply: CRISIS_REPLY.to_string(),
            unavailable_reply: UNAVAILABLE_REPLY.to_string(),
            listening_prompt: LISTENING_PROMPT.to_string(),
        }
    }
}
