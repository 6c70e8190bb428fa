//! Error types for the conversation crate.
//!
//! - `SessionError`: Errors from session store operations
//! - `ConversationError`: Errors returned to callers of the orchestrator
//!
//! Model failures are not errors at this level: the orchestrator turns
//! them into a fallback envelope.

use std::fmt;

/// Errors from session store operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    /// Storage operation failed.
    StorageFailed { reason: String },
}

impl fmt::Display for SessionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::StorageFailed { reason } => {
                write!(f, "session storage failed: {reason}")
            }
        }
    }
}

impl std::error::Error for SessionError {}

/// High-level conversation errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConversationError {
    /// The inbound message is missing or empty.
    InvalidInput { reason: String },
    /// A response policy text is empty.
    InvalidPolicy { field: &'static str },
}

impl ConversationError {
    /// The error for a missing or blank message.
    #[must_use]
    pub fn message_required() -> Self {
        Self::InvalidInput {
            reason: "message is required".to_string(),
        }
    }
}

impl fmt::Display for ConversationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidInput { reason } => f.write_str(reason),
            Self::InvalidPolicy { field } => {
                write!(f, "response policy text '{field}' must not be empty")
            }
        }
    }
}

impl std::error::Error for ConversationError {}
