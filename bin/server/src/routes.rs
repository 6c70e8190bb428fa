//! JSON API handlers.

use crate::app::AppState;
use crate::error::ApiError;
use crate::types::{ClearSessionRequest, ClearSessionResponse, HealthResponse, MessageRequest};
use axum::{
    Json,
    body::Bytes,
    extract::{State, rejection::JsonRejection},
    http::{HeaderMap, StatusCode, header},
    response::{IntoResponse, Response},
};
use solace_core::{RequestId, SessionKey};
use std::sync::Arc;
use tracing::{Instrument, info_span};

/// Handles a chat message.
///
/// Responds 200 for replies and crisis responses, 503 when the model could
/// not answer. The body always carries a readable `reply`.
pub async fn message(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<MessageRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(request) = payload.map_err(|e| ApiError::MalformedBody(e.body_text()))?;
    let key = SessionKey::resolve(request.session_id.as_deref(), &state.default_session_key);
    let message = request.message.unwrap_or_default();

    let span = info_span!("message", request_id = %RequestId::new(), session_key = %key);
    let envelope = state
        .orchestrator
        .handle_message(&key, &message)
        .instrument(span)
        .await?;

    let status = if envelope.is_failure() {
        StatusCode::SERVICE_UNAVAILABLE
    } else {
        StatusCode::OK
    };

    Ok((status, Json(envelope)).into_response())
}

/// Clears a session.
///
/// An empty body clears the default key. A non-empty body must be JSON
/// naming the session; anything else is rejected without clearing.
pub async fn clear_session(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<ClearSessionResponse>, ApiError> {
    let request = parse_clear_request(&headers, &body)?;
    let key = SessionKey::resolve(request.session_id.as_deref(), &state.default_session_key);

    state
        .orchestrator
        .clear_session(&key)
        .await
        .map_err(|report| ApiError::Store(report.to_string()))?;

    Ok(Json(ClearSessionResponse::cleared()))
}

fn parse_clear_request(headers: &HeaderMap, body: &[u8]) -> Result<ClearSessionRequest, ApiError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(ClearSessionRequest::default());
    }

    if !is_json_content_type(headers) {
        return Err(ApiError::MalformedBody(
            "Expected request with `Content-Type: application/json`".to_string(),
        ));
    }

    Json::<ClearSessionRequest>::from_bytes(body)
        .map(|Json(request)| request)
        .map_err(|e| ApiError::MalformedBody(e.body_text()))
}

fn is_json_content_type(headers: &HeaderMap) -> bool {
    headers
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(';').next())
        .map(str::trim)
        .is_some_and(|mime| mime == "application/json" || mime.ends_with("+json"))
}

/// Reports liveness and the number of live sessions.
pub async fn health(State(state): State<Arc<AppState>>) -> Result<Json<HealthResponse>, ApiError> {
    let active_sessions = state
        .orchestrator
        .active_sessions()
        .await
        .map_err(|report| ApiError::Store(report.to_string()))?;

    Ok(Json(HealthResponse {
        status: "ok".to_string(),
        active_sessions,
    }))
}
