//! Login session types.
//!
//! A [`LoginSession`] represents the authenticated admin's credential state:
//! the bearer access token issued by the backend. The refresh credential
//! never enters the session; it lives in an httpOnly browser cookie and is
//! only ever forwarded verbatim.

use std::fmt;
use ulid::Ulid;

/// Unique identifier for a server-side session.
///
/// Session IDs are opaque strings carried in the session cookie.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SessionId(String);

impl SessionId {
    /// Creates a session ID from an existing string (e.g. a cookie value).
    #[must_use]
    pub fn new(id: String) -> Self {
        Self(id)
    }

    /// Generates a fresh random session ID.
    #[must_use]
    pub fn generate() -> Self {
        Self(Ulid::new().to_string())
    }

    /// Returns the session ID as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for SessionId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for SessionId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// The authenticated admin's credential state for one server-side session.
///
/// Invariant: a constructed `LoginSession` always holds a non-empty access
/// token. A refresh that yields a blank token must clear the session rather
/// than store it ([`crate::SessionStore::update_access_token`] enforces
/// this).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginSession {
    access_token: String,
}

impl LoginSession {
    /// Creates a login session from a backend-issued access token.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidAccessToken`] if the token is empty or
    /// whitespace-only.
    pub fn new(access_token: impl Into<String>) -> Result<Self, InvalidAccessToken> {
        let access_token = access_token.into();
        if access_token.trim().is_empty() {
            return Err(InvalidAccessToken);
        }
        Ok(Self { access_token })
    }

    /// Returns the bearer access token.
    #[must_use]
    pub fn access_token(&self) -> &str {
        &self.access_token
    }
}

/// Error returned when constructing a login session from a blank token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidAccessToken;

impl fmt::Display for InvalidAccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "access token must not be empty")
    }
}

impl std::error::Error for InvalidAccessToken {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_id_display() {
        let id = SessionId::new("sess-123".to_string());
        assert_eq!(id.to_string(), "sess-123");
    }

    #[test]
    fn generated_session_ids_are_unique() {
        assert_ne!(SessionId::generate(), SessionId::generate());
    }

    #[test]
    fn login_session_holds_token() {
        let session = LoginSession::new("backend-token").expect("valid token");
        assert_eq!(session.access_token(), "backend-token");
    }

    #[test]
    fn login_session_rejects_empty_token() {
        assert_eq!(LoginSession::new(""), Err(InvalidAccessToken));
    }

    #[test]
    fn login_session_rejects_whitespace_token() {
        assert_eq!(LoginSession::new("   "), Err(InvalidAccessToken));
    }
}
