//! Backend service health client.

use crate::client::BackendClient;
use crate::context::ApiContext;
use crate::error::ApiError;
use chrono::{DateTime, Utc};
use reqwest::Method;
use serde::Serialize;
use tracing::debug;

/// Result of a backend health probe.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceHealth {
    /// True if the health endpoint answered with a success status.
    pub alive: bool,
    /// Human-readable status line for the dashboard.
    pub message: String,
    /// When the probe ran.
    pub checked_at: DateTime<Utc>,
}

/// Client for the backend's `/health` endpoint.
///
/// The health path lives directly under the configured base URL; the admin
/// API prefix injection does not apply.
#[derive(Debug, Clone)]
pub struct HealthClient {
    backend: BackendClient,
}

impl HealthClient {
    /// Creates a health client on top of the shared backend client.
    #[must_use]
    pub fn new(backend: BackendClient) -> Self {
        Self { backend }
    }

    /// Probes the backend's health endpoint.
    ///
    /// Transport failures and error statuses are reported as a down status
    /// rather than an error; only session expiry propagates.
    pub async fn check_health(&self, ctx: &ApiContext) -> Result<ServiceHealth, ApiError> {
        let checked_at = Utc::now();
        let request = self.backend.request_unprefixed(Method::GET, &["health"])?;

        let response = match self.backend.execute(ctx, request).await {
            Ok(response) => response,
            Err(ApiError::AuthExpired) => return Err(ApiError::AuthExpired),
            Err(err) => {
                debug!(%err, "health probe failed");
                return Ok(ServiceHealth {
                    alive: false,
                    message: err.to_string(),
                    checked_at,
                });
            }
        };

        let status = response.status();
        if !status.is_success() {
            return Ok(ServiceHealth {
                alive: false,
                message: format!("HTTP status {}", status.as_u16()),
                checked_at,
            });
        }

        let body: Option<serde_json::Value> = response.json().await.ok();
        Ok(ServiceHealth {
            alive: true,
            message: status_message(body.as_ref()),
            checked_at,
        })
    }
}

fn status_message(body: Option<&serde_json::Value>) -> String {
    if let Some(status) = body.and_then(|value| value.get("status")) {
        let status = match status {
            serde_json::Value::String(s) => s.clone(),
            other => other.to_string(),
        };
        return format!("status: {status}");
    }
    "backend responded normally".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use httptest::matchers::request;
    use httptest::responders::{json_encoded, status_code};
    use httptest::{Expectation, Server};
    use saerok_admin_session::{LoginSession, SessionStore};
    use serde_json::json;
    use std::sync::Arc;

    fn client_and_ctx(server: &Server) -> (HealthClient, ApiContext) {
        let props = crate::ApiProps::new(server.url_str("/"), Some("/api/v1")).expect("valid props");
        let backend = BackendClient::new(&props).expect("client builds");
        let store = Arc::new(SessionStore::new(Duration::minutes(30)));
        let id = store.create();
        store.establish(&id, LoginSession::new("token").expect("valid token"));
        (HealthClient::new(backend), ApiContext::new(store, id))
    }

    #[tokio::test]
    async fn up_status_is_reported_from_the_body() {
        let server = Server::run();
        // Note the path: no /api/v1 prefix even though one is configured.
        server.expect(
            Expectation::matching(request::method_path("GET", "/health"))
                .respond_with(json_encoded(json!({"status": "UP"}))),
        );

        let (client, ctx) = client_and_ctx(&server);
        let health = client.check_health(&ctx).await.expect("probe completes");

        assert!(health.alive);
        assert_eq!(health.message, "status: UP");
    }

    #[tokio::test]
    async fn empty_body_still_counts_as_alive() {
        let server = Server::run();
        server.expect(
            Expectation::matching(request::method_path("GET", "/health"))
                .respond_with(status_code(200)),
        );

        let (client, ctx) = client_and_ctx(&server);
        let health = client.check_health(&ctx).await.expect("probe completes");

        assert!(health.alive);
        assert_eq!(health.message, "backend responded normally");
    }

    #[tokio::test]
    async fn server_error_reports_down_with_status_code() {
        let server = Server::run();
        server.expect(
            Expectation::matching(request::method_path("GET", "/health"))
                .respond_with(status_code(500)),
        );

        let (client, ctx) = client_and_ctx(&server);
        let health = client.check_health(&ctx).await.expect("probe completes");

        assert!(!health.alive);
        assert_eq!(health.message, "HTTP status 500");
    }

    #[tokio::test]
    async fn unreachable_backend_reports_down() {
        // Port 1 is never listening.
        let props = crate::ApiProps::new("http://127.0.0.1:1", None).expect("valid props");
        let backend = BackendClient::new(&props).expect("client builds");
        let store = Arc::new(SessionStore::new(Duration::minutes(30)));
        let id = store.create();
        let ctx = ApiContext::new(store, id);

        let health = HealthClient::new(backend)
            .check_health(&ctx)
            .await
            .expect("probe completes");
        assert!(!health.alive);
    }
}
