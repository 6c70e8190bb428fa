//! Application wiring: shared state, the router, and the serve loop.

use crate::config::ServerConfig;
use crate::error::StartupError;
use crate::routes;
use axum::{
    Router,
    routing::{get, post},
};
use solace_ai::GeminiBackend;
use solace_conversation::{ConversationOrchestrator, InMemorySessionRegistry};
use solace_core::SessionKey;
use solace_triage::{CrisisClassifier, RiskRules};
use std::path::Path;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};

/// Application state shared across handlers.
pub struct AppState {
    pub orchestrator: ConversationOrchestrator,
    pub default_session_key: SessionKey,
}

impl AppState {
    /// Creates new application state.
    pub fn new(orchestrator: ConversationOrchestrator, default_session_key: SessionKey) -> Self {
        Self {
            orchestrator,
            default_session_key,
        }
    }

    /// Builds state from configuration, using the Gemini backend.
    ///
    /// # Errors
    ///
    /// Returns an error if the crisis rules, model settings or reply texts
    /// are invalid.
    pub fn from_config(config: &ServerConfig) -> solace_core::Result<Self, StartupError> {
        let rules = match &config.crisis_rules_path {
            Some(path) => RiskRules::load(path).map_err(|report| StartupError::Rules {
                reason: report.to_string(),
            })?,
            None => RiskRules::builtin(),
        };
        let classifier = CrisisClassifier::new(&rules).map_err(|report| StartupError::Rules {
            reason: report.to_string(),
        })?;

        let generation = config.model.generation_config();
        generation.validate().map_err(|e| StartupError::Model {
            reason: e.to_string(),
        })?;

        let backend = GeminiBackend::new(
            config.model.base_url.as_str(),
            config.google_api_key.as_str(),
            config.model.timeout(),
        )
        .map_err(|report| StartupError::Model {
            reason: report.to_string(),
        })?;

        let policy = config.replies.policy().map_err(|e| StartupError::Policy {
            reason: e.to_string(),
        })?;

        let orchestrator = ConversationOrchestrator::new(
            Arc::new(classifier),
            Arc::new(InMemorySessionRegistry::new()),
            Arc::new(backend),
        )
        .with_policy(policy)
        .with_default_config(generation)
        .with_model_timeout(config.model.timeout());

        Ok(Self::new(orchestrator, config.session_key()))
    }
}

/// Builds the router.
///
/// API routes live under `/api`. When `static_dir` is set, every other
/// path is served from it.
pub fn router(state: Arc<AppState>, static_dir: Option<&Path>, cors_permissive: bool) -> Router {
    let api = Router::new()
        .route("/message", post(routes::message))
        .route("/chat", post(routes::message))
        .route("/clear-session", post(routes::clear_session))
        .route("/health", get(routes::health));

    let mut app = Router::new().nest("/api", api);

    if let Some(dir) = static_dir {
        app = app.fallback_service(ServeDir::new(dir));
    }

    if cors_permissive {
        app = app.layer(CorsLayer::permissive());
    }

    app.layer(TraceLayer::new_for_http()).with_state(state)
}

/// Builds the application from configuration and serves it until a
/// shutdown signal arrives.
///
/// # Errors
///
/// Returns an error if startup fails or the server stops abnormally.
pub async fn serve(config: ServerConfig) -> solace_core::Result<(), StartupError> {
    let state = Arc::new(AppState::from_config(&config)?);
    let app = router(state, config.static_dir.as_deref(), config.cors_permissive);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .map_err(|e| StartupError::Bind {
            addr: config.bind_addr.clone(),
            reason: e.to_string(),
        })?;

    tracing::info!(
        model = %config.model.name,
        "listening on http://{}",
        config.bind_addr
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| StartupError::Serve {
            reason: e.to_string(),
        })?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!(error = %e, "Failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use rootcause::prelude::Report;
    use axum::{
        body::{Body, to_bytes},
        http::{Request, StatusCode},
    };
    use serde_json::{Value, json};
    use solace_ai::{ChatBackend, GenerationConfig, LlmError, LlmMessage};
    use solace_conversation::response::{CRISIS_REPLY, UNAVAILABLE_REPLY};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use crate::config::{ModelConfig, ReplyConfig};
    use tower::ServiceExt;

    /// Replies with a fixed text, or fails every call.
    struct StubBackend {
        reply: Option<String>,
        calls: AtomicUsize,
    }

    impl StubBackend {
        fn replying(text: &str) -> Self {
            Self {
                reply: Some(text.to_string()),
                calls: AtomicUsize::new(0),
            }
        }

        fn failing() -> Self {
            Self {
                reply: None,
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl ChatBackend for StubBackend {
        async fn send_message(
            &self,
            _history: &[LlmMessage],
            _message: &str,
            _config: &GenerationConfig,
        ) -> Result<String, Report<LlmError>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match &self.reply {
                Some(text) => Ok(text.clone()),
                None => Err(LlmError::ProviderError {
                    status: 500,
                    reason: "boom".to_string(),
                }
                .into()),
            }
        }

        fn provider(&self) -> &str {
            "stub"
        }
    }

    fn app(backend: Arc<StubBackend>) -> Router {
        let orchestrator = ConversationOrchestrator::new(
            Arc::new(CrisisClassifier::builtin().unwrap()),
            Arc::new(InMemorySessionRegistry::new()),
            backend,
        );
        let state = Arc::new(AppState::new(orchestrator, SessionKey::default()));
        router(state, None, true)
    }

    fn post_json(uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, body)
    }

    async fn health(app: &Router) -> Value {
        let request = Request::builder()
            .uri("/api/health")
            .body(Body::empty())
            .unwrap();
        let (status, body) = send(app, request).await;
        assert_eq!(status, StatusCode::OK);
        body
    }

    #[tokio::test]
    async fn message_returns_model_reply() {
        let app = app(Arc::new(StubBackend::replying("That sounds really hard.")));

        let (status, body) = send(
            &app,
            post_json("/api/message", json!({"message": "I feel sad", "sessionId": "s1"})),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body,
            json!({"isCrisis": false, "reply": "That sounds really hard."})
        );
        assert_eq!(health(&app).await["activeSessions"], 1);
    }

    #[tokio::test]
    async fn chat_alias_behaves_like_message() {
        let app = app(Arc::new(StubBackend::replying("hello")));

        let (status, body) = send(&app, post_json("/api/chat", json!({"message": "hi"}))).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["reply"], "hello");
    }

    #[tokio::test]
    async fn crisis_message_bypasses_model() {
        let backend = Arc::new(StubBackend::replying("should not be used"));
        let app = app(Arc::clone(&backend));

        let (status, body) = send(
            &app,
            post_json("/api/message", json!({"message": "I want to kill myself"})),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["isCrisis"], true);
        assert_eq!(body["reply"], CRISIS_REPLY);
        assert_eq!(backend.calls.load(Ordering::SeqCst), 0);
        assert_eq!(health(&app).await["activeSessions"], 0);
    }

    #[tokio::test]
    async fn missing_message_is_bad_request() {
        let app = app(Arc::new(StubBackend::replying("unused")));

        let (status, body) = send(&app, post_json("/api/message", json!({"sessionId": "s1"}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({"error": "message is required"}));

        let (status, _) = send(&app, post_json("/api/message", json!({"message": "   "}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn malformed_body_is_bad_request() {
        let app = app(Arc::new(StubBackend::replying("unused")));
        let request = Request::builder()
            .method("POST")
            .uri("/api/message")
            .header("content-type", "application/json")
            .body(Body::from("{not json"))
            .unwrap();

        let (status, body) = send(&app, request).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].is_string());
    }

    #[tokio::test]
    async fn model_failure_is_service_unavailable_with_reply() {
        let app = app(Arc::new(StubBackend::failing()));

        let (status, body) = send(&app, post_json("/api/message", json!({"message": "hello"}))).await;

        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["isCrisis"], false);
        assert_eq!(body["reply"], UNAVAILABLE_REPLY);
        assert!(body["error"].is_string());
    }

    #[tokio::test]
    async fn clear_session_removes_session() {
        let app = app(Arc::new(StubBackend::replying("ok")));
        send(&app, post_json("/api/message", json!({"message": "hi", "sessionId": "s1"}))).await;
        assert_eq!(health(&app).await["activeSessions"], 1);

        let (status, body) = send(
            &app,
            post_json("/api/clear-session", json!({"sessionId": "s1"})),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"success": true, "message": "Session cleared"}));
        assert_eq!(health(&app).await["activeSessions"], 0);
    }

    #[tokio::test]
    async fn clear_session_without_body_clears_default() {
        let app = app(Arc::new(StubBackend::replying("ok")));
        send(&app, post_json("/api/message", json!({"message": "hi"}))).await;

        let request = Request::builder()
            .method("POST")
            .uri("/api/clear-session")
            .body(Body::empty())
            .unwrap();
        let (status, body) = send(&app, request).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        assert_eq!(health(&app).await["activeSessions"], 0);
    }

    #[tokio::test]
    async fn unreadable_clear_request_keeps_default_session() {
        let app = app(Arc::new(StubBackend::replying("ok")));
        send(&app, post_json("/api/message", json!({"message": "hi"}))).await;

        let bodies = [
            ("application/json", r#"{"sessionId": 42}"#),
            ("application/json", "{not json"),
            ("text/plain", r#"{"sessionId":"abc"}"#),
        ];
        for (content_type, body) in bodies {
            let request = Request::builder()
                .method("POST")
                .uri("/api/clear-session")
                .header("content-type", content_type)
                .body(Body::from(body))
                .unwrap();

            let (status, response) = send(&app, request).await;

            assert_eq!(status, StatusCode::BAD_REQUEST, "body: {body}");
            assert!(response["error"].is_string());
            assert_eq!(health(&app).await["activeSessions"], 1);
        }
    }

    #[tokio::test]
    async fn clearing_unknown_session_succeeds() {
        let app = app(Arc::new(StubBackend::replying("ok")));

        let (status, _) = send(
            &app,
            post_json("/api/clear-session", json!({"sessionId": "never"})),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
    }

    #[test]
    fn state_from_config_rejects_invalid_rules_file() {
        let config = ServerConfig {
            google_api_key: "key".to_string(),
            bind_addr: "127.0.0.1:0".to_string(),
            default_session_key: "default".to_string(),
            static_dir: None,
            cors_permissive: true,
            crisis_rules_path: Some("/nonexistent/rules.json".into()),
            model: ModelConfig::default(),
            replies: ReplyConfig::default(),
        };

        assert!(AppState::from_config(&config).is_err());
    }

    #[test]
    fn state_from_config_builds_with_builtin_rules() {
        let config = ServerConfig {
            google_api_key: "key".to_string(),
            bind_addr: "127.0.0.1:0".to_string(),
            default_session_key: "web".to_string(),
            static_dir: None,
            cors_permissive: false,
            crisis_rules_path: None,
            model: ModelConfig::default(),
            replies: ReplyConfig::default(),
        };

        let state = AppState::from_config(&config).unwrap();
        assert_eq!(state.default_session_key.as_str(), "web");
    }

    #[tokio::test]
    async fn configured_crisis_reply_is_served() {
        let config = ServerConfig {
            google_api_key: "key".to_string(),
            bind_addr: "127.0.0.1:0".to_string(),
            default_session_key: "default".to_string(),
            static_dir: None,
            cors_permissive: true,
            crisis_rules_path: None,
            model: ModelConfig::default(),
            replies: ReplyConfig {
                crisis: Some("Call or text 988 right now.".to_string()),
                ..ReplyConfig::default()
            },
        };
        let app = router(Arc::new(AppState::from_config(&config).unwrap()), None, true);

        let (status, body) = send(
            &app,
            post_json("/api/message", json!({"message": "I want to die"})),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body,
            json!({"isCrisis": true, "reply": "Call or text 988 right now."})
        );
    }

    #[test]
    fn state_from_config_rejects_blank_reply_override() {
        let config = ServerConfig {
            google_api_key: "key".to_string(),
            bind_addr: "127.0.0.1:0".to_string(),
            default_session_key: "default".to_string(),
            static_dir: None,
            cors_permissive: true,
            crisis_rules_path: None,
            model: ModelConfig::default(),
            replies: ReplyConfig {
                unavailable: Some(String::new()),
                ..ReplyConfig::default()
            },
        };

        assert!(AppState::from_config(&config).is_err());
    }
}
