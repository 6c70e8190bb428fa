//! Centralized server configuration.
//!
//! This module provides strongly-typed configuration for the server,
//! loaded via the `config` crate from environment variables. Nested
//! sections use `__` as separator, e.g. `MODEL__TEMPERATURE=0.7`.

use serde::Deserialize;
use solace_ai::GenerationConfig;
use solace_ai::backend::{DEFAULT_MODEL, DEFAULT_SYSTEM_INSTRUCTION, DEFAULT_TEMPERATURE, DEFAULT_TOP_P};
use solace_ai::gemini::DEFAULT_BASE_URL;
use solace_conversation::response::{CRISIS_REPLY, LISTENING_PROMPT, UNAVAILABLE_REPLY};
use solace_conversation::{ConversationError, ResponsePolicy};
use solace_core::SessionKey;
use std::path::PathBuf;
use std::time::Duration;

/// Server configuration.
#[derive(Debug, Deserialize)]
pub struct ServerConfig {
    /// API key for the Gemini API.
    pub google_api_key: String,

    /// Address to listen on.
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    /// Session key used when a request carries none.
    #[serde(default = "default_session_key")]
    pub default_session_key: String,

    /// Directory of front-end files served for non-API paths.
    #[serde(default)]
    pub static_dir: Option<PathBuf>,

    /// Whether to allow cross-origin requests from any origin.
    #[serde(default = "default_cors_permissive")]
    pub cors_permissive: bool,

    /// JSON file replacing the built-in risk rules.
    #[serde(default)]
    pub crisis_rules_path: Option<PathBuf>,

    /// Model configuration.
    #[serde(default)]
    pub model: ModelConfig,

    /// Reply text overrides.
    #[serde(default)]
    pub replies: ReplyConfig,
}

/// Model-related configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ModelConfig {
    /// Model identifier.
    #[serde(default = "default_model_name")]
    pub name: String,

    /// Sampling temperature.
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Nucleus sampling threshold.
    #[serde(default = "default_top_p")]
    pub top_p: f32,

    /// Maximum tokens per reply.
    #[serde(default)]
    pub max_output_tokens: Option<u32>,

    /// Bound on a single model call, in seconds.
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,

    /// API base URL.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Replaces the built-in system instruction.
    #[serde(default)]
    pub system_instruction: Option<String>,
}

/// Overrides for the fixed reply texts. Unset entries keep the built-in text.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReplyConfig {
    /// Reply sent for crisis messages.
    #[serde(default)]
    pub crisis: Option<String>,

    /// Reply sent when the model cannot answer.
    #[serde(default)]
    pub unavailable: Option<String>,

    /// Reply used when the model answers with no text.
    #[serde(default)]
    pub listening: Option<String>,
}

impl ReplyConfig {
    /// Builds the response policy.
    ///
    /// # Errors
    ///
    /// Returns `InvalidPolicy` if an override is blank.
    pub fn policy(&self) -> Result<ResponsePolicy, ConversationError> {
        ResponsePolicy::new(
            self.crisis.as_deref().unwrap_or(CRISIS_REPLY),
            self.unavailable.as_deref().unwrap_or(UNAVAILABLE_REPLY),
            self.listening.as_deref().unwrap_or(LISTENING_PROMPT),
        )
    }
}

fn default_bind_addr() -> String {
    "127.0.0.1:3000".to_string()
}

fn default_session_key() -> String {
    SessionKey::DEFAULT.to_string()
}

fn default_cors_permissive() -> bool {
    true
}

fn default_model_name() -> String {
    DEFAULT_MODEL.to_string()
}

fn default_temperature() -> f32 {
    DEFAULT_TEMPERATURE
}

fn default_top_p() -> f32 {
    DEFAULT_TOP_P
}

fn default_timeout_seconds() -> u64 {
    30
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            name: default_model_name(),
            temperature: default_temperature(),
            top_p: default_top_p(),
            max_output_tokens: None,
            timeout_seconds: default_timeout_seconds(),
            base_url: default_base_url(),
            system_instruction: None,
        }
    }
}

impl ModelConfig {
    /// Returns the configuration snapshot new sessions are created with.
    #[must_use]
    pub fn generation_config(&self) -> GenerationConfig {
        let system_instruction = self
            .system_instruction
            .clone()
            .unwrap_or_else(|| DEFAULT_SYSTEM_INSTRUCTION.to_string());

        let config = GenerationConfig::new(self.name.clone(), system_instruction)
            .with_temperature(self.temperature)
            .with_top_p(self.top_p);

        match self.max_output_tokens {
            Some(max) => config.with_max_output_tokens(max),
            None => config,
        }
    }

    /// Returns the model call timeout.
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}

impl ServerConfig {
    /// Loads configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if required configuration is missing or invalid.
    pub fn from_env() -> Result<Self, config::ConfigError> {
        Self::from_environment(config::Environment::default())
    }

    fn from_environment(environment: config::Environment) -> Result<Self, config::ConfigError> {
        config::Config::builder()
            .add_source(environment.separator("__").try_parsing(true))
            .build()?
            .try_deserialize()
    }

    /// Returns the resolved default session key.
    #[must_use]
    pub fn session_key(&self) -> SessionKey {
        SessionKey::resolve(Some(&self.default_session_key), &SessionKey::default())
    }
}
