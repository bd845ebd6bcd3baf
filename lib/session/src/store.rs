//! In-memory session store.
//!
//! One entry per browser session, keyed by the session cookie's ID. The
//! entry is the single source of truth for the login state and the pending
//! OAuth state token; there is no second mutable view to keep in sync.
//!
//! Entries expire after an idle TTL; every access slides the deadline.
//! Expired entries are treated as missing and reaped lazily on access plus
//! periodically by the server's cleanup task.

use crate::session::{LoginSession, SessionId};
use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::{DateTime, Duration, Utc};
use rand::RngCore;
use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::sync::Mutex;

/// Number of random bytes in an OAuth state token.
const STATE_TOKEN_BYTES: usize = 24;

#[derive(Debug)]
struct SessionEntry {
    login: Option<LoginSession>,
    oauth_state: Option<String>,
    expires_at: DateTime<Utc>,
}

/// Thread-safe in-memory store of server-side sessions.
///
/// Two concurrent requests for the same session are an accepted race: both
/// may observe a stale token and refresh independently; whichever update
/// lands last wins. No per-session lock is taken across backend calls.
#[derive(Debug)]
pub struct SessionStore {
    ttl: Duration,
    sessions: Mutex<HashMap<SessionId, SessionEntry>>,
}

impl SessionStore {
    /// Creates a store whose entries expire after `ttl` of inactivity.
    #[must_use]
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            sessions: Mutex::new(HashMap::new()),
        }
    }

    /// Creates a fresh empty session and returns its ID.
    pub fn create(&self) -> SessionId {
        let id = SessionId::generate();
        let mut sessions = self.lock();
        sessions.insert(
            id.clone(),
            SessionEntry {
                login: None,
                oauth_state: None,
                expires_at: Utc::now() + self.ttl,
            },
        );
        id
    }

    /// Returns true if a live (non-expired) session exists for `id`.
    pub fn exists(&self, id: &SessionId) -> bool {
        let mut sessions = self.lock();
        live_entry(&mut sessions, id, self.ttl).is_some()
    }

    /// Stores a login session, replacing any previous one.
    ///
    /// Creates the session entry if it does not exist, matching the
    /// establish-on-login behavior of the web layer.
    pub fn establish(&self, id: &SessionId, login: LoginSession) {
        let mut sessions = self.lock();
        match live_entry(&mut sessions, id, self.ttl) {
            Some(entry) => entry.login = Some(login),
            None => {
                sessions.insert(
                    id.clone(),
                    SessionEntry {
                        login: Some(login),
                        oauth_state: None,
                        expires_at: Utc::now() + self.ttl,
                    },
                );
            }
        }
    }

    /// Returns the login session for `id`, if one exists.
    ///
    /// Absence (unknown session, expired session, session without a login)
    /// is an empty result, never an error.
    pub fn login(&self, id: &SessionId) -> Option<LoginSession> {
        let mut sessions = self.lock();
        live_entry(&mut sessions, id, self.ttl).and_then(|entry| entry.login.clone())
    }

    /// Returns the current access token for `id`, if logged in.
    pub fn access_token(&self, id: &SessionId) -> Option<String> {
        self.login(id)
            .map(|session| session.access_token().to_string())
    }

    /// Replaces the stored access token in place.
    ///
    /// A blank token means the refresh did not produce a usable credential:
    /// the login is cleared instead, never kept stale. A missing session is
    /// a no-op.
    pub fn update_access_token(&self, id: &SessionId, access_token: &str) {
        match LoginSession::new(access_token) {
            Ok(login) => {
                let mut sessions = self.lock();
                if let Some(entry) = live_entry(&mut sessions, id, self.ttl) {
                    entry.login = Some(login);
                }
            }
            Err(_) => self.clear_login(id),
        }
    }

    /// Removes the login from the session, keeping the session itself.
    ///
    /// Idempotent: clearing an already-cleared session is a no-op.
    pub fn clear_login(&self, id: &SessionId) {
        let mut sessions = self.lock();
        if let Some(entry) = live_entry(&mut sessions, id, self.ttl) {
            entry.login = None;
        }
    }

    /// Drops the whole session entry (logout).
    pub fn remove(&self, id: &SessionId) {
        let mut sessions = self.lock();
        sessions.remove(id);
    }

    /// Generates a fresh OAuth state token and stores it on the session.
    ///
    /// Creates the session entry if it does not exist. Any previously
    /// stored state token is replaced.
    pub fn create_state(&self, id: &SessionId) -> String {
        let state = generate_state_token();
        let mut sessions = self.lock();
        match live_entry(&mut sessions, id, self.ttl) {
            Some(entry) => entry.oauth_state = Some(state.clone()),
            None => {
                sessions.insert(
                    id.clone(),
                    SessionEntry {
                        login: None,
                        oauth_state: Some(state.clone()),
                        expires_at: Utc::now() + self.ttl,
                    },
                );
            }
        }
        state
    }

    /// Returns the stored OAuth state token without consuming it.
    pub fn oauth_state(&self, id: &SessionId) -> Option<String> {
        let mut sessions = self.lock();
        live_entry(&mut sessions, id, self.ttl).and_then(|entry| entry.oauth_state.clone())
    }

    /// Consumes the stored OAuth state token and compares it to `provided`.
    ///
    /// The stored value is removed unconditionally: single use even on a
    /// mismatch. A missing session or missing stored value is a non-match,
    /// not an error.
    pub fn consume_state(&self, id: &SessionId, provided: &str) -> bool {
        let mut sessions = self.lock();
        let Some(entry) = live_entry(&mut sessions, id, self.ttl) else {
            return false;
        };
        match entry.oauth_state.take() {
            Some(stored) => stored == provided,
            None => false,
        }
    }

    /// Removes all expired entries, returning how many were dropped.
    pub fn purge_expired(&self) -> usize {
        let now = Utc::now();
        let mut sessions = self.lock();
        let before = sessions.len();
        sessions.retain(|_, entry| entry.expires_at > now);
        before - sessions.len()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<SessionId, SessionEntry>> {
        // A poisoned mutex means another thread panicked mid-update; the
        // map itself is still structurally sound, so keep serving.
        match self.sessions.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

/// Looks up a live entry, reaping it if expired and sliding the idle
/// deadline otherwise.
fn live_entry<'a>(
    sessions: &'a mut HashMap<SessionId, SessionEntry>,
    id: &SessionId,
    ttl: Duration,
) -> Option<&'a mut SessionEntry> {
    let now = Utc::now();
    match sessions.entry(id.clone()) {
        Entry::Occupied(occupied) => {
            if occupied.get().expires_at <= now {
                occupied.remove();
                None
            } else {
                let entry = occupied.into_mut();
                entry.expires_at = now + ttl;
                Some(entry)
            }
        }
        Entry::Vacant(_) => None,
    }
}

fn generate_state_token() -> String {
    let mut bytes = [0u8; STATE_TOKEN_BYTES];
    rand::rng().fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> SessionStore {
        SessionStore::new(Duration::minutes(30))
    }

    #[test]
    fn establish_and_find_login() {
        let store = store();
        let id = store.create();
        store.establish(&id, LoginSession::new("token-1").expect("valid"));

        assert_eq!(store.access_token(&id), Some("token-1".to_string()));
    }

    #[test]
    fn missing_session_is_empty_not_error() {
        let store = store();
        let id = SessionId::generate();

        assert!(store.login(&id).is_none());
        assert!(store.access_token(&id).is_none());
        assert!(!store.exists(&id));
    }

    #[test]
    fn establish_creates_missing_entry() {
        let store = store();
        let id = SessionId::generate();
        store.establish(&id, LoginSession::new("token-1").expect("valid"));

        assert!(store.exists(&id));
        assert_eq!(store.access_token(&id), Some("token-1".to_string()));
    }

    #[test]
    fn update_access_token_replaces_in_place() {
        let store = store();
        let id = store.create();
        store.establish(&id, LoginSession::new("old-token").expect("valid"));

        store.update_access_token(&id, "new-token");

        assert_eq!(store.access_token(&id), Some("new-token".to_string()));
    }

    #[test]
    fn blank_refreshed_token_clears_login() {
        let store = store();
        let id = store.create();
        store.establish(&id, LoginSession::new("old-token").expect("valid"));

        store.update_access_token(&id, "   ");

        assert!(store.access_token(&id).is_none());
        // The session itself survives; only the login is gone.
        assert!(store.exists(&id));
    }

    #[test]
    fn clear_login_is_idempotent() {
        let store = store();
        let id = store.create();
        store.establish(&id, LoginSession::new("token").expect("valid"));

        store.clear_login(&id);
        store.clear_login(&id);

        assert!(store.login(&id).is_none());
    }

    #[test]
    fn remove_drops_the_session() {
        let store = store();
        let id = store.create();
        store.establish(&id, LoginSession::new("token").expect("valid"));

        store.remove(&id);

        assert!(!store.exists(&id));
    }

    #[test]
    fn state_token_is_single_use() {
        let store = store();
        let id = store.create();
        let state = store.create_state(&id);

        assert!(store.consume_state(&id, &state));
        assert!(!store.consume_state(&id, &state));
    }

    #[test]
    fn mismatched_state_still_consumes() {
        let store = store();
        let id = store.create();
        let state = store.create_state(&id);

        assert!(!store.consume_state(&id, "wrong-state"));
        // The stored value was removed on the mismatch.
        assert!(!store.consume_state(&id, &state));
    }

    #[test]
    fn consume_state_without_session_is_non_match() {
        let store = store();
        assert!(!store.consume_state(&SessionId::generate(), "anything"));
    }

    #[test]
    fn state_tokens_are_unique_and_url_safe() {
        let store = store();
        let a = store.create_state(&store.create());
        let b = store.create_state(&store.create());

        assert_ne!(a, b);
        // 24 bytes of entropy, unpadded URL-safe base64.
        assert_eq!(a.len(), 32);
        assert!(
            a.chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        );
    }

    #[test]
    fn expired_sessions_are_missing_and_purged() {
        let store = SessionStore::new(Duration::minutes(-1));
        let id = store.create();
        store.establish(&id, LoginSession::new("token").expect("valid"));

        assert!(store.login(&id).is_none());

        let other = SessionStore::new(Duration::minutes(-1));
        other.create();
        other.create();
        assert_eq!(other.purge_expired(), 2);
        assert_eq!(other.purge_expired(), 0);
    }
}
