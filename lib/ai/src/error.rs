//! Error types for the AI crate.
//!
//! Backends return `LlmError` inside a rootcause `Report`; callers treat
//! every variant as the model being unavailable for this request.

use std::fmt;

/// Errors from chat backend operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LlmError {
    /// Request could not be sent or the connection failed.
    RequestFailed { reason: String },
    /// Provider answered with a non-success status.
    ProviderError { status: u16, reason: String },
    /// Response parsing failed.
    ResponseParseFailed { reason: String },
    /// Timeout waiting for response.
    Timeout,
    /// Invalid configuration.
    InvalidConfig { reason: String },
}

impl fmt::Display for LlmError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RequestFailed { reason } => {
                write!(f, "LLM request failed: {reason}")
            }
            Self::ProviderError { status, reason } => {
                write!(f, "LLM provider returned {status}: {reason}")
            }
            Self::ResponseParseFailed { reason } => {
                write!(f, "failed to parse LLM response: {reason}")
            }
            Self::Timeout => write!(f, "LLM request timed out"),
            Self::InvalidConfig { reason } => {
                write!(f, "invalid LLM configuration: {reason}")
            }
        }
    }
}

impl std::error::Error for LlmError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_error_display() {
        let err = LlmError::ProviderError {
            status: 429,
            reason: "quota exceeded".to_string(),
        };
        assert!(err.to_string().contains("429"));
        assert!(err.to_string().contains("quota exceeded"));
    }

    #[test]
    fn timeout_display() {
        assert_eq!(LlmError::Timeout.to_string(), "LLM request timed out");
    }
}
