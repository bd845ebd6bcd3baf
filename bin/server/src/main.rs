//! Saerok admin console server.
//!
//! A thin web layer over the backend API: staff authenticate via Kakao or
//! Apple social login (the backend performs the code exchange), and every
//! admin endpoint is a typed pass-through to the backend with transparent
//! token refresh.

mod admin;
mod auth;
mod config;
mod error;

use crate::auth::{AppState, SocialLoginUrls};
use crate::config::ServerConfig;
use axum::Router;
use axum::routing::{get, post};
use chrono::Duration;
use saerok_admin_backend::BackendClient;
use saerok_admin_session::SessionStore;
use std::sync::Arc;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration from environment
    let config = ServerConfig::from_env().expect("failed to load configuration");
    tracing::info!("Loaded configuration");

    let props = config
        .api
        .to_props()
        .expect("invalid backend API configuration");
    if !props.missing_prefix_segments().is_empty() {
        tracing::info!(
            prefix = props.prefix(),
            "base URL does not carry the API prefix; injecting it on admin paths"
        );
    }
    let backend = BackendClient::new(&props).expect("failed to build backend client");
    let oauth = SocialLoginUrls::new(&config.oauth).expect("invalid social login configuration");

    let sessions = Arc::new(SessionStore::new(Duration::minutes(
        config.session.duration_minutes,
    )));

    // Spawn periodic session cleanup task
    let cleanup_sessions = sessions.clone();
    let cleanup_interval_secs = config.session.cleanup_interval_seconds;
    tokio::spawn(async move {
        let mut interval =
            tokio::time::interval(std::time::Duration::from_secs(cleanup_interval_secs));
        loop {
            interval.tick().await;
            let purged = cleanup_sessions.purge_expired();
            if purged > 0 {
                tracing::debug!(purged, "purged expired sessions");
            }
        }
    });

    let app_state = Arc::new(AppState::new(
        sessions,
        backend,
        oauth,
        config.session.clone(),
    ));

    let app = Router::new()
        // Auth routes
        .route("/login", get(auth::login))
        .route("/login/kakao", get(auth::login_kakao))
        .route("/login/apple", get(auth::login_apple))
        .route("/auth/callback/kakao", get(auth::kakao_callback))
        .route(
            "/auth/callback/apple",
            get(auth::apple_callback_get).post(auth::apple_callback_post),
        )
        .route("/logout", post(auth::logout))
        // Admin routes
        .route("/", get(admin::dashboard))
        .route("/admin/ads", get(admin::list_ads))
        .route("/admin/ads/slots", get(admin::list_slots))
        .route("/admin/ads/placements", get(admin::list_placements))
        .route("/admin/reports/collections", get(admin::collection_reports))
        .route(
            "/admin/reports/collections/{id}",
            get(admin::collection_report_detail),
        )
        .route("/admin/reports/comments", get(admin::comment_reports))
        .route(
            "/admin/reports/comments/{id}",
            get(admin::comment_report_detail),
        )
        .route("/admin/audit/logs", get(admin::audit_logs))
        .route("/admin/stats/series", get(admin::stats_series))
        .with_state(app_state);

    let listener = tokio::net::TcpListener::bind(&config.listen_addr)
        .await
        .expect("failed to bind to address");

    tracing::info!("listening on http://{}", config.listen_addr);

    axum::serve(listener, app.into_make_service())
        .await
        .expect("server error");
}
