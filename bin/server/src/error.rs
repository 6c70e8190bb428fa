//! Error types for the HTTP surface.
//!
//! - `ApiError`: Request failures rendered as JSON `{error}` bodies
//! - `StartupError`: Failures while wiring the server together

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use solace_conversation::ConversationError;
use std::fmt;

/// Errors returned by request handlers.
#[derive(Debug)]
pub enum ApiError {
    /// The message is missing or blank.
    InvalidInput(String),
    /// The body is not valid JSON for the endpoint.
    MalformedBody(String),
    /// The session store failed.
    Store(String),
}

impl From<ConversationError> for ApiError {
    fn from(err: ConversationError) -> Self {
        Self::InvalidInput(err.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            Self::InvalidInput(msg) | Self::MalformedBody(msg) => (StatusCode::BAD_REQUEST, msg),
            Self::Store(msg) => {
                tracing::error!("Session store error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}

/// Errors raised while starting the server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StartupError {
    /// Crisis rules could not be loaded or compiled.
    Rules { reason: String },
    /// The model configuration or client is invalid.
    Model { reason: String },
    /// A configured reply text is invalid.
    Policy { reason: String },
    /// The listen address could not be bound.
    Bind { addr: String, reason: String },
    /// The server stopped with an error.
    Serve { reason: String },
}

impl fmt::Display for StartupError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Rules { reason } => write!(f, "failed to load crisis rules: {reason}"),
            Self::Model { reason } => write!(f, "invalid model configuration: {reason}"),
            Self::Policy { reason } => write!(f, "invalid reply configuration: {reason}"),
            Self::Bind { addr, reason } => write!(f, "failed to bind to {addr}: {reason}"),
            Self::Serve { reason } => write!(f, "server error: {reason}"),
        }
    }
}

impl std::error::Error for StartupError {}
