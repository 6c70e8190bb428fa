//! Chat backend abstraction.
//!
//! Provides a unified interface for the generative model that answers
//! users. The conversation layer owns history; a backend is stateless and
//! receives the full history on every call.

use crate::error::LlmError;
use async_trait::async_trait;
use rootcause::prelude::Report;
use serde::{Deserialize, Serialize};

/// Default model identifier.
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";

/// Default sampling temperature.
pub const DEFAULT_TEMPERATURE: f32 = 0.8;

/// Default nucleus sampling threshold.
pub const DEFAULT_TOP_P: f32 = 0.95;

/// Default system instruction for the support companion.
pub const DEFAULT_SYSTEM_INSTRUCTION: &str = "\
You are a warm, understanding mental health support companion. Your role is to provide genuine empathy, validation, and practical coping strategies.

Core Principles:
1. LISTEN DEEPLY: Acknowledge the person's feelings without minimizing them. Use phrases like \"That sounds really difficult\" or \"It makes sense you'd feel that way given what you're going through.\"

2. VALIDATE EMOTIONS: Never say \"it's okay\" or \"don't worry\" - these dismiss feelings. Instead, normalize their experience: \"Many people feel overwhelmed in situations like this\" or \"Your reaction is completely understandable.\"

3. PROVIDE PRACTICAL TOOLS: After validating, offer 2-3 specific, actionable coping strategies tailored to their situation:
   - For anxiety: breathing exercises (4-7-8 technique), grounding (5-4-3-2-1 method), progressive muscle relaxation
   - For sadness/depression: small achievable tasks, connecting with one person, gentle movement, sunlight exposure
   - For stress: breaking tasks into tiny steps, setting boundaries, self-compassion breaks
   - For anger: physical release (exercise, squeezing ice), journaling, timeout strategies
   - For loneliness: reaching out to one person, joining online communities, volunteering
   - For overwhelm: priority triaging, \"one thing at a time\" approach, asking for help

4. ASK THOUGHTFUL QUESTIONS: Help them explore solutions:
   - \"What's helped you cope with similar feelings before?\"
   - \"What would make today 1% easier?\"
   - \"Who in your life might understand what you're going through?\"
   - \"What's one small thing you could do right now to take care of yourself?\"

5. ENCOURAGE PROFESSIONAL SUPPORT: When appropriate, gently suggest therapy, counseling, or speaking with a doctor - frame it as a strength, not a failure.

6. BE CONCISE BUT WARM: Keep responses to 2-3 paragraphs. Use a conversational, caring tone - like a supportive friend who happens to know evidence-based strategies.

What NOT to do:
- Don't say \"everything will be fine\" or \"it's okay\" - this invalidates their current pain
- Don't give medical diagnoses or prescribe medication
- Don't be overly formal or clinical
- Don't overwhelm with too many suggestions at once
- Don't minimize their struggles by comparing to others

Remember: You're here to support, not fix. Sometimes people just need to feel heard and receive one helpful strategy they can try today.";

/// Generation settings fixed for the lifetime of a session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationConfig {
    /// Model identifier.
    pub model: String,
    /// System instruction sent with every call.
    pub system_instruction: String,
    /// Temperature for sampling.
    pub temperature: f32,
    /// Nucleus sampling threshold.
    pub top_p: f32,
    /// Maximum tokens to generate.
    pub max_output_tokens: Option<u32>,
}

impl GenerationConfig {
    /// Creates a configuration with default sampling for a model.
    #[must_use]
    pub fn new(model: impl Into<String>, system_instruction: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            system_instruction: system_instruction.into(),
            temperature: DEFAULT_TEMPERATURE,
            top_p: DEFAULT_TOP_P,
            max_output_tokens: None,
        }
    }

    /// Sets the temperature.
    #[must_use]
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    /// Sets the nucleus sampling threshold.
    #[must_use]
    pub fn with_top_p(mut self, top_p: f32) -> Self {
        self.top_p = top_p;
        self
    }

    /// Sets the max output tokens.
    #[must_use]
    pub fn with_max_output_tokens(mut self, max_output_tokens: u32) -> Self {
        self.max_output_tokens = Some(max_output_tokens);
        self
    }

    /// Checks the sampling parameters are in range.
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` when a parameter is out of range.
    pub fn validate(&self) -> Result<(), LlmError> {
        if self.model.trim().is_empty() {
            return Err(LlmError::InvalidConfig {
                reason: "model name is empty".to_string(),
            });
        }
        if !(0.0..=2.0).contains(&self.temperature) {
            return Err(LlmError::InvalidConfig {
                reason: format!("temperature {} outside 0.0..=2.0", self.temperature),
            });
        }
        if !(0.0..=1.0).contains(&self.top_p) {
            return Err(LlmError::InvalidConfig {
                reason: format!("top_p {} outside 0.0..=1.0", self.top_p),
            });
        }
        Ok(())
    }
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self::new(DEFAULT_MODEL, DEFAULT_SYSTEM_INSTRUCTION)
    }
}

/// The role of a message sender.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    /// User/human message.
    User,
    /// Assistant/AI message.
    Assistant,
}

/// A message in a conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LlmMessage {
    /// The role of the message sender.
    pub role: MessageRole,
    /// The content of the message.
    pub content: String,
}

impl LlmMessage {
    /// Creates a user message.
    #[must_use]
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::User,
            content: content.into(),
        }
    }

    /// Creates an assistant message.
    #[must_use]
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::Assistant,
            content: content.into(),
        }
    }
}

/// Trait for chat backends.
///
/// Implementations must not retain `history`; the caller commits turns
/// only after a call succeeds.
#[async_trait]
pub trait ChatBackend: Send + Sync {
    /// Sends `message` after `history` and returns the reply text.
    ///
    /// # Errors
    ///
    /// Returns an error on transport, provider or parsing failure.
    async fn send_message(
        &self,
        history: &[LlmMessage],
        message: &str,
        config: &GenerationConfig,
    ) -> Result<String, Report<LlmError>>;

    /// Returns a short provider name for logs.
    fn provider(&self) -> &str;
}
