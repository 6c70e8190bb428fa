//! Session registry.
//!
//! The registry is the only way the orchestrator reaches sessions, so a
//! persistent or expiring store can replace the in-memory one without
//! touching control flow.
//!
//! There is no TTL or eviction: sessions live until deleted or until the
//! process exits.

use crate::error::SessionError;
use crate::session::Session;
use async_trait::async_trait;
use solace_ai::GenerationConfig;
use solace_core::{Result, SessionKey};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::Mutex as AsyncMutex;
use tracing::debug;

/// A session shared between the registry and in-flight requests.
///
/// The async mutex is held for a whole round trip, which serializes
/// history mutation per key.
pub type SharedSession = Arc<AsyncMutex<Session>>;

/// Trait for session storage.
#[async_trait]
pub trait SessionRegistry: Send + Sync {
    /// Returns the session for `key`, creating it with `config` if absent.
    ///
    /// Concurrent callers with the same key always receive the same
    /// instance.
    async fn get_or_create(
        &self,
        key: &SessionKey,
        config: &GenerationConfig,
    ) -> Result<SharedSession, SessionError>;

    /// Removes the session for `key`.
    ///
    /// Deleting an absent key succeeds; the return value reports whether
    /// anything was removed.
    async fn delete(&self, key: &SessionKey) -> Result<bool, SessionError>;

    /// Returns the number of live sessions.
    async fn count(&self) -> Result<usize, SessionError>;
}

/// Process-local session registry.
#[derive(Debug, Default)]
pub struct InMemorySessionRegistry {
    sessions: Mutex<HashMap<SessionKey, SharedSession>>,
}

impl InMemorySessionRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn sessions(
        &self,
    ) -> Result<MutexGuard<'_, HashMap<SessionKey, SharedSession>>, SessionError> {
        self.sessions.lock().map_err(|_| {
            SessionError::StorageFailed {
                reason: "session map lock poisoned".to_string(),
            }
            .into()
        })
    }
}

#[async_trait]
impl SessionRegistry for InMemorySessionRegistry {
    async fn get_or_create(
        &self,
        key: &SessionKey,
        config: &GenerationConfig,
    ) -> Result<SharedSession, SessionError> {
        let mut sessions = self.sessions()?;
        let session = sessions.entry(key.clone()).or_insert_with(|| {
            debug!(session_key = %key, "Creating session");
            Arc::new(AsyncMutex::new(Session::new(key.clone(), config.clone())))
        });
        Ok(Arc::clone(session))
    }

    async fn delete(&self, key: &SessionKey) -> Result<bool, SessionError> {
        let removed = self.sessions()?.remove(key).is_some();
        debug!(session_key = %key, removed, "Deleted session");
        Ok(removed)
    }

    async fn count(&self) -> Result<usize, SessionError> {
        Ok(self.sessions()?.len())
    }
}
