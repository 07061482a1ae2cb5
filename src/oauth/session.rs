//! Per-visitor OAuth session state.
//!
//! Sessions are keyed by an opaque random id carried in a cookie. Each session
//! sits behind its own async mutex; the callback handler holds that lock for its
//! whole run, so two callbacks on one session are serialized and the second one
//! observes the cleared session.

use async_trait::async_trait;
use rand::rngs::OsRng;
use rand::RngCore;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;

use super::pkce::CodeVerifier;
use super::token::AccessToken;

/// Opaque session identifier (32 random bytes, hex).
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct SessionId(String);

impl SessionId {
    pub fn generate() -> Self {
        let mut bytes = [0u8; 32];
        OsRng.fill_bytes(&mut bytes);
        Self(hex::encode(bytes))
    }

    /// Accepts a cookie value only if it has the shape of a generated id.
    pub fn from_cookie(value: &str) -> Option<Self> {
        (value.len() == 64 && value.chars().all(|c| c.is_ascii_hexdigit()))
            .then(|| Self(value.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Enough to correlate log lines without exposing the bearer value
        write!(f, "SessionId({}…)", &self.0[..8.min(self.0.len())])
    }
}

/// Server-side state of one authorization flow.
#[derive(Debug, Default)]
pub struct Session {
    pub code_verifier: Option<CodeVerifier>,
    pub state: Option<String>,
    pub used_code: Option<String>,
    pub access_token: Option<AccessToken>,
}

impl Session {
    /// A freshly initiated flow.
    pub fn initiated(code_verifier: CodeVerifier, state: String) -> Self {
        Self {
            code_verifier: Some(code_verifier),
            state: Some(state),
            used_code: None,
            access_token: None,
        }
    }

    /// Wipes every field.
    pub fn clear(&mut self) {
        *self = Session::default();
    }
}

pub type SessionHandle = Arc<Mutex<Session>>;

/// Storage for sessions, injected into both handlers.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Stores `session` under `id`, replacing any previous entry.
    async fn insert(&self, id: SessionId, session: Session);

    /// Returns the live session for `id`; expired sessions are never returned.
    async fn get(&self, id: &SessionId) -> Option<SessionHandle>;

    /// Drops the session; later lookups miss.
    async fn remove(&self, id: &SessionId);
}

struct Entry {
    handle: SessionHandle,
    expires_at: Instant,
}

/// In-process session store with a fixed time-to-live.
pub struct MemorySessionStore {
    ttl: Duration,
    sessions: Mutex<HashMap<SessionId, Entry>>,
}

impl MemorySessionStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            sessions: Mutex::new(HashMap::new()),
        }
    }

    #[cfg(test)]
    async fn len(&self) -> usize {
        self.sessions.lock().await.len()
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn insert(&self, id: SessionId, session: Session) {
        let now = Instant::now();
        let mut sessions = self.sessions.lock().await;
        sessions.retain(|_, entry| entry.expires_at > now);
        sessions.insert(
            id,
            Entry {
                handle: Arc::new(Mutex::new(session)),
                expires_at: now + self.ttl,
            },
        );
    }

    async fn get(&self, id: &SessionId) -> Option<SessionHandle> {
        let now = Instant::now();
        let mut sessions = self.sessions.lock().await;
        let found = sessions
            .get(id)
            .map(|entry| (entry.expires_at > now, entry.handle.clone()));
        match found {
            Some((true, handle)) => Some(handle),
            Some((false, _)) => {
                tracing::debug!("Session {:?} expired", id);
                sessions.remove(id);
                None
            }
            None => None,
        }
    }

    async fn remove(&self, id: &SessionId) {
        self.sessions.lock().await.remove(id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cookie_value_must_look_like_generated_id() {
        let id = SessionId::generate();
        assert_eq!(SessionId::from_cookie(id.as_str()), Some(id));
        assert_eq!(SessionId::from_cookie("short"), None);
        assert_eq!(SessionId::from_cookie(&"z".repeat(64)), None);
    }

    #[tokio::test]
    async fn insert_get_remove() {
        let store = MemorySessionStore::new(Duration::from_secs(60));
        let id = SessionId::generate();
        store
            .insert(
                id.clone(),
                Session::initiated(CodeVerifier::generate(), "state".to_string()),
            )
            .await;

        let handle = store.get(&id).await.unwrap();
        assert_eq!(handle.lock().await.state.as_deref(), Some("state"));

        store.remove(&id).await;
        assert!(store.get(&id).await.is_none());
    }

    #[tokio::test]
    async fn expired_sessions_are_dropped() {
        let store = MemorySessionStore::new(Duration::ZERO);
        let id = SessionId::generate();
        store.insert(id.clone(), Session::default()).await;

        assert!(store.get(&id).await.is_none());
        assert_eq!(store.len().await, 0);
    }

    #[test]
    fn clear_resets_all_fields() {
        let mut session = Session::initiated(CodeVerifier::generate(), "s".to_string());
        session.used_code = Some("code".to_string());
        session.clear();
        assert!(session.code_verifier.is_none());
        assert!(session.state.is_none());
        assert!(session.used_code.is_none());
    }
}
