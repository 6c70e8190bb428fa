//! Request and response bodies for the JSON API.

use serde::{Deserialize, Serialize};

/// Body of `POST /api/message`.
///
/// Both fields are optional on the wire so a missing message is reported
/// as a 400 with the usual error body, not a deserialization failure.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageRequest {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub session_id: Option<String>,
}

/// Body of `POST /api/clear-session`.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClearSessionRequest {
    #[serde(default)]
    pub session_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClearSessionResponse {
    pub success: bool,
    pub message: String,
}

impl ClearSessionResponse {
    #[must_use]
    pub fn cleared() -> Self {
        Self {
            success: true,
            message: "Session cleared".to_string(),
        }
    }
}

/// Body of `GET /api/health`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: String,
    pub active_sessions: usize,
}
