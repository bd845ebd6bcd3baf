//! Authentication module for the admin console server.
//!
//! This module provides:
//! - Social login bootstrap (Kakao/Apple authorize URLs with CSRF state)
//! - OAuth callback handling against the backend's login endpoints
//! - Session cookie plumbing and the `RequireAuth` extractor
//!
//! The console itself performs no code exchange with the providers: the
//! authorization code from the callback is handed to the backend, which
//! returns the bearer access token this console stores in the session and a
//! `refreshToken` cookie this console forwards to the browser untouched.

pub mod middleware;
pub mod oauth;
pub mod routes;

use crate::config::SessionConfig;
use saerok_admin_backend::{
    AdClient, AuditLogClient, BackendClient, HealthClient, ProfileClient, ReportClient, StatClient,
};
use saerok_admin_session::SessionStore;
use std::sync::Arc;

pub use middleware::{RequireAuth, api_context, current_session, ensure_session};
pub use oauth::SocialLoginUrls;
pub use routes::{
    apple_callback_get, apple_callback_post, kakao_callback, login, login_apple, login_kakao,
    logout,
};

/// Shared application state.
pub struct AppState {
    /// In-memory session store.
    pub sessions: Arc<SessionStore>,
    /// Authorized backend API client (auth client included).
    pub backend: BackendClient,
    /// Ad management client.
    pub ads: AdClient,
    /// Report review client.
    pub reports: ReportClient,
    /// Statistics client.
    pub stats: StatClient,
    /// Audit log client.
    pub audit: AuditLogClient,
    /// Current admin profile client.
    pub profile: ProfileClient,
    /// Service health client.
    pub health: HealthClient,
    /// Social login authorize-URL builder.
    pub oauth: SocialLoginUrls,
    /// Session configuration.
    pub session_config: SessionConfig,
}

impl AppState {
    /// Creates the application state, deriving the domain clients from the
    /// shared backend client.
    pub fn new(
        sessions: Arc<SessionStore>,
        backend: BackendClient,
        oauth: SocialLoginUrls,
        session_config: SessionConfig,
    ) -> Self {
        Self {
            sessions,
            ads: AdClient::new(backend.clone()),
            reports: ReportClient::new(backend.clone()),
            stats: StatClient::new(backend.clone()),
            audit: AuditLogClient::new(backend.clone()),
            profile: ProfileClient::new(backend.clone()),
            health: HealthClient::new(backend.clone()),
            backend,
            oauth,
            session_config,
        }
    }
}
