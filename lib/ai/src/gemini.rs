//! Gemini `generateContent` backend.
//!
//! Sends the whole history on every call; the Gemini API keeps no chat
//! state between requests.

use crate::backend::{ChatBackend, GenerationConfig, LlmMessage, MessageRole};
use crate::error::LlmError;
use async_trait::async_trait;
use rootcause::prelude::Report;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, instrument};

/// Default Gemini API base URL.
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Chat backend for Google's Gemini API.
#[derive(Debug, Clone)]
pub struct GeminiBackend {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl GeminiBackend {
    /// Creates a backend with a client-level request timeout.
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` if the API key is empty or the HTTP client
    /// cannot be built.
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, Report<LlmError>> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(LlmError::InvalidConfig {
                reason: "API key is empty".to_string(),
            }
            .into());
        }

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| LlmError::InvalidConfig {
                reason: e.to_string(),
            })?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key,
        })
    }

    fn endpoint(&self, model: &str) -> String {
        format!("{}/models/{}:generateContent", self.base_url, model)
    }
}

#[async_trait]
impl ChatBackend for GeminiBackend {
    #[instrument(skip_all, fields(model = %config.model, history_len = history.len()))]
    async fn send_message(
        &self,
        history: &[LlmMessage],
        message: &str,
        config: &GenerationConfig,
    ) -> Result<String, Report<LlmError>> {
        let body = GenerateContentRequest::build(history, message, config);

        let response = self
            .client
            .post(self.endpoint(&config.model))
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    LlmError::Timeout
                } else {
                    LlmError::RequestFailed {
                        reason: e.to_string(),
                    }
                }
            })?;

        let status = response.status();
        let text = response.text().await.map_err(|e| LlmError::RequestFailed {
            reason: e.to_string(),
        })?;

        if !status.is_success() {
            return Err(LlmError::ProviderError {
                status: status.as_u16(),
                reason: provider_error_message(&text),
            }
            .into());
        }

        let parsed: GenerateContentResponse =
            serde_json::from_str(&text).map_err(|e| LlmError::ResponseParseFailed {
                reason: e.to_string(),
            })?;

        let reply = parsed.reply_text();
        debug!(reply_len = reply.len(), "Gemini reply received");
        Ok(reply)
    }

    fn provider(&self) -> &str {
        "gemini"
    }
}

/// Extracts the provider's error message, falling back to the raw body.
fn provider_error_message(body: &str) -> String {
    serde_json::from_str::<ErrorEnvelope>(body)
        .map(|e| e.error.message)
        .unwrap_or_else(|_| body.chars().take(200).collect())
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    system_instruction: Content,
    contents: Vec<Content>,
    generation_config: WireGenerationConfig,
}

impl GenerateContentRequest {
    fn build(history: &[LlmMessage], message: &str, config: &GenerationConfig) -> Self {
        let contents = history
            .iter()
            .map(|m| Content::new(Some(wire_role(m.role)), &m.content))
            .chain(std::iter::once(Content::new(Some("user"), message)))
            .collect();

        Self {
            system_instruction: Content::new(None, &config.system_instruction),
            contents,
            generation_config: WireGenerationConfig {
                temperature: config.temperature,
                top_p: config.top_p,
                max_output_tokens: config.max_output_tokens,
            },
        }
    }
}

fn wire_role(role: MessageRole) -> &'static str {
    match role {
        MessageRole::User => "user",
        MessageRole::Assistant => "model",
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<Part>,
}

impl Content {
    fn new(role: Option<&str>, text: &str) -> Self {
        Self {
            role: role.map(str::to_string),
            parts: vec![Part {
                text: Some(text.to_string()),
            }],
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct WireGenerationConfig {
    temperature: f32,
    top_p: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_output_tokens: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

impl GenerateContentResponse {
    /// Concatenates the text parts of the first candidate.
    fn reply_text(&self) -> String {
        self.candidates
            .first()
            .and_then(|c| c.content.as_ref())
            .map(|content| {
                content
                    .parts
                    .iter()
                    .filter_map(|p| p.text.as_deref())
                    .collect::<String>()
            })
            .unwrap_or_default()
    }
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}
