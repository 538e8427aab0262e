/// In-memory admin sessions with an idle timeout
use chrono::{DateTime, Duration, Utc};
use rand::{distributions::Alphanumeric, Rng};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

pub const TOKEN_LENGTH: usize = 32;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub username: String,
    pub created_at: DateTime<Utc>,
    pub last_seen: DateTime<Utc>,
}

/// Token → session map shared across request handlers
#[derive(Clone)]
pub struct SessionStore {
    sessions: Arc<RwLock<HashMap<String, Session>>>,
    idle_timeout: Duration,
}

impl SessionStore {
    pub fn new(idle_timeout: Duration) -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
            idle_timeout,
        }
    }

    pub fn generate_token() -> String {
        rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(TOKEN_LENGTH)
            .map(char::from)
            .collect()
    }

    /// Issue a fresh token for `username`
    pub async fn create(&self, username: &str) -> String {
        let token = Self::generate_token();
        let now = Utc::now();

        let mut sessions = self.sessions.write().await;
        sessions.insert(
            token.clone(),
            Session {
                username: username.to_string(),
                created_at: now,
                last_seen: now,
            },
        );

        debug!("session issued for {}", username);
        token
    }

    /// Look up a token and refresh its idle clock. Expired sessions are evicted.
    pub async fn validate(&self, token: &str) -> Option<Session> {
        let now = Utc::now();
        let mut sessions = self.sessions.write().await;

        let session = sessions.get_mut(token)?;
        if now - session.last_seen > self.idle_timeout {
            sessions.remove(token);
            debug!("session expired");
            return None;
        }

        session.last_seen = now;
        Some(session.clone())
    }

    /// Remove a session, handing back what was stored for it
    pub async fn revoke(&self, token: &str) -> Option<Session> {
        self.sessions.write().await.remove(token)
    }

    /// Drop every idle session; returns how many were removed
    pub async fn purge_expired(&self) -> usize {
        let now = Utc::now();
        let mut sessions = self.sessions.write().await;

        let before = sessions.len();
        sessions.retain(|_, session| now - session.last_seen <= self.idle_timeout);
        before - sessions.len()
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    #[cfg(test)]
    pub(crate) async fn backdate(&self, token: &str, by: Duration) {
        if let Some(session) = self.sessions.write().await.get_mut(token) {
            session.last_seen = session.last_seen - by;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_shape() {
        let token = SessionStore::generate_token();
        assert_eq!(token.len(), TOKEN_LENGTH);
        assert!(token.chars().all(|c| c.is_ascii_alphanumeric()));
        assert_ne!(token, SessionStore::generate_token());
    }

    #[tokio::test]
    async fn test_create_validate_revoke() {
        let store = SessionStore::new(Duration::minutes(20));
        let token = store.create("camadmin").await;

        let session = store.validate(&token).await.unwrap();
        assert_eq!(session.username, "camadmin");
        assert!(store.validate("unknown").await.is_none());

        let revoked = store.revoke(&token).await.unwrap();
        assert_eq!(revoked.username, "camadmin");
        assert_eq!(revoked.created_at, session.created_at);
        assert!(revoked.last_seen >= revoked.created_at);

        assert!(store.validate(&token).await.is_none());
        assert!(store.revoke(&token).await.is_none());
    }

    #[tokio::test]
    async fn test_idle_sessions_expire() {
        let store = SessionStore::new(Duration::minutes(20));
        let token = store.create("camadmin").await;

        store.backdate(&token, Duration::minutes(21)).await;
        assert!(store.validate(&token).await.is_none());
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_use_refreshes_idle_clock() {
        let store = SessionStore::new(Duration::minutes(20));
        let token = store.create("camadmin").await;

        store.backdate(&token, Duration::minutes(15)).await;
        assert!(store.validate(&token).await.is_some());
        store.backdate(&token, Duration::minutes(15)).await;
        assert!(store.validate(&token).await.is_some());
    }

    #[tokio::test]
    async fn test_purge_expired() {
        let store = SessionStore::new(Duration::minutes(20));
        let stale = store.create("camadmin").await;
        let _fresh = store.create("camadmin").await;

        store.backdate(&stale, Duration::hours(1)).await;
        assert_eq!(store.purge_expired().await, 1);
        assert_eq!(store.len().await, 1);
    }
}
