//! Web-layer error handling.
//!
//! Backend errors surface to handlers as a typed result; the session-expired
//! case is mapped to the login redirect here instead of relying on a
//! cross-cutting exception handler.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Redirect, Response};
use saerok_admin_backend::ApiError;
use std::fmt;

/// Errors a request handler can finish with.
#[derive(Debug)]
pub enum WebError {
    /// The backend session expired and could not be refreshed. The session
    /// store was already cleared by the authorization layer.
    SessionExpired,
    /// Any other backend API failure.
    Backend(ApiError),
}

impl From<ApiError> for WebError {
    fn from(err: ApiError) -> Self {
        if err.is_auth_expired() {
            Self::SessionExpired
        } else {
            Self::Backend(err)
        }
    }
}

impl fmt::Display for WebError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SessionExpired => write!(f, "session expired"),
            Self::Backend(err) => write!(f, "backend call failed: {err}"),
        }
    }
}

impl std::error::Error for WebError {}

impl IntoResponse for WebError {
    fn into_response(self) -> Response {
        match self {
            Self::SessionExpired => Redirect::to("/login?error=session").into_response(),
            Self::Backend(err) => {
                tracing::error!(%err, "backend call failed");
                (StatusCode::BAD_GATEWAY, "Backend request failed").into_response()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auth_expired_maps_to_session_expired() {
        let err: WebError = ApiError::AuthExpired.into();
        assert!(matches!(err, WebError::SessionExpired));
    }

    #[test]
    fn other_errors_stay_backend_errors() {
        let err: WebError = ApiError::Transport {
            details: "connection refused".to_string(),
        }
        .into();
        assert!(matches!(err, WebError::Backend(_)));
    }
}
