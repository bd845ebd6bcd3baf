//! Per-request API call context.
//!
//! The original console read "the current request" from ambient state at
//! arbitrary call sites. Here the context is explicit: the web layer builds
//! one [`ApiContext`] per inbound request and threads it through every
//! backend call, which makes the authorization layer testable without a
//! simulated request environment.

use saerok_admin_session::{SessionId, SessionStore};
use std::sync::{Arc, Mutex};

/// Request-scoped context for backend API calls.
///
/// Bundles the caller's session (for token reads and updates), the inbound
/// `refreshToken` cookie value (forwarded to the refresh endpoint), and a
/// buffer of `Set-Cookie` values the web layer must write to the outgoing
/// browser response.
#[derive(Debug)]
pub struct ApiContext {
    store: Arc<SessionStore>,
    session_id: SessionId,
    refresh_cookie: Option<String>,
    set_cookies: Mutex<Vec<String>>,
}

impl ApiContext {
    /// Creates a context for the given session.
    #[must_use]
    pub fn new(store: Arc<SessionStore>, session_id: SessionId) -> Self {
        Self {
            store,
            session_id,
            refresh_cookie: None,
            set_cookies: Mutex::new(Vec::new()),
        }
    }

    /// Attaches the inbound `refreshToken` cookie value.
    #[must_use]
    pub fn with_refresh_cookie(mut self, value: impl Into<String>) -> Self {
        self.refresh_cookie = Some(value.into());
        self
    }

    /// Returns the session this context is bound to.
    #[must_use]
    pub fn session_id(&self) -> &SessionId {
        &self.session_id
    }

    /// Returns the current access token, if the session is logged in.
    #[must_use]
    pub fn access_token(&self) -> Option<String> {
        self.store.access_token(&self.session_id)
    }

    /// Replaces the stored access token; a blank token clears the login.
    pub fn update_access_token(&self, access_token: &str) {
        self.store.update_access_token(&self.session_id, access_token);
    }

    /// Clears the login from the session. Idempotent.
    pub fn clear_login(&self) {
        self.store.clear_login(&self.session_id);
    }

    /// Returns the inbound `refreshToken` cookie value, if present.
    #[must_use]
    pub fn refresh_cookie(&self) -> Option<&str> {
        self.refresh_cookie.as_deref()
    }

    /// Buffers backend `Set-Cookie` values for the outgoing response.
    pub fn push_set_cookies(&self, cookies: &[String]) {
        if cookies.is_empty() {
            return;
        }
        self.lock_cookies().extend_from_slice(cookies);
    }

    /// Drains the buffered `Set-Cookie` values.
    ///
    /// The web layer appends these verbatim to the browser response after
    /// the handler's backend calls complete.
    #[must_use]
    pub fn take_set_cookies(&self) -> Vec<String> {
        std::mem::take(&mut *self.lock_cookies())
    }

    fn lock_cookies(&self) -> std::sync::MutexGuard<'_, Vec<String>> {
        match self.set_cookies.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use saerok_admin_session::LoginSession;

    fn context_with_token(token: &str) -> (Arc<SessionStore>, ApiContext) {
        let store = Arc::new(SessionStore::new(Duration::minutes(30)));
        let id = store.create();
        store.establish(&id, LoginSession::new(token).expect("valid token"));
        let ctx = ApiContext::new(store.clone(), id);
        (store, ctx)
    }

    #[test]
    fn reads_token_through_the_store() {
        let (_store, ctx) = context_with_token("token-1");
        assert_eq!(ctx.access_token().as_deref(), Some("token-1"));
    }

    #[test]
    fn token_update_is_visible_to_the_store() {
        let (store, ctx) = context_with_token("token-1");
        ctx.update_access_token("token-2");
        assert_eq!(
            store.access_token(ctx.session_id()).as_deref(),
            Some("token-2")
        );
    }

    #[test]
    fn set_cookie_buffer_drains_once() {
        let (_store, ctx) = context_with_token("token");
        ctx.push_set_cookies(&["refreshToken=abc; Path=/; HttpOnly".to_string()]);

        assert_eq!(
            ctx.take_set_cookies(),
            vec!["refreshToken=abc; Path=/; HttpOnly".to_string()]
        );
        assert!(ctx.take_set_cookies().is_empty());
    }

    #[test]
    fn refresh_cookie_is_carried_verbatim() {
        let (_store, ctx) = context_with_token("token");
        let ctx = ctx.with_refresh_cookie("opaque-refresh-value");
        assert_eq!(ctx.refresh_cookie(), Some("opaque-refresh-value"));
    }
}
