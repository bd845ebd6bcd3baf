//! Error types for backend API calls.

use std::fmt;

/// Errors from calls to the Saerok backend API.
#[derive(Debug)]
pub enum ApiError {
    /// A login or refresh response did not contain a usable access token.
    InvalidAuthResponse {
        /// What was wrong with the response.
        details: String,
    },
    /// An authorized call could not be established even after one token
    /// refresh. The session has already been cleared when this is returned.
    AuthExpired,
    /// The backend returned a non-success status.
    Status {
        /// HTTP status code.
        status: u16,
        /// Raw response body, useful for surfacing backend error messages.
        body: String,
    },
    /// Transport-level failure (connection, TLS, timeout).
    Transport {
        /// Error details.
        details: String,
    },
    /// The response body was missing or could not be decoded.
    InvalidResponse {
        /// Error details.
        details: String,
    },
    /// The request could not be constructed from the given inputs.
    InvalidRequest {
        /// Error details.
        details: String,
    },
}

impl ApiError {
    /// Returns true if this error means the admin must log in again.
    #[must_use]
    pub fn is_auth_expired(&self) -> bool {
        matches!(self, Self::AuthExpired)
    }

    /// Extracts the backend's human-readable error message, if the error
    /// carries a `{"status": ..., "message": ...}` body.
    #[must_use]
    pub fn backend_message(&self) -> Option<String> {
        let Self::Status { body, .. } = self else {
            return None;
        };
        let parsed: serde_json::Value = serde_json::from_str(body).ok()?;
        parsed
            .get("message")
            .and_then(serde_json::Value::as_str)
            .filter(|message| !message.trim().is_empty())
            .map(str::to_string)
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidAuthResponse { details } => {
                write!(f, "invalid backend auth response: {details}")
            }
            Self::AuthExpired => {
                write!(f, "session expired, please log in again")
            }
            Self::Status { status, body } => {
                write!(f, "backend returned status {status}: {body}")
            }
            Self::Transport { details } => {
                write!(f, "backend request failed: {details}")
            }
            Self::InvalidResponse { details } => {
                write!(f, "invalid backend response: {details}")
            }
            Self::InvalidRequest { details } => {
                write!(f, "invalid backend request: {details}")
            }
        }
    }
}

impl std::error::Error for ApiError {}
