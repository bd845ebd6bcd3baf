//! Current admin profile client.

use crate::client::BackendClient;
use crate::context::ApiContext;
use crate::error::ApiError;
use reqwest::Method;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// The logged-in admin's profile as shown in the console header.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminProfile {
    pub nickname: Option<String>,
    pub email: Option<String>,
    pub profile_image_url: Option<String>,
    /// Normalized admin role codes (uppercase, deduplicated).
    pub roles: Vec<String>,
}

/// Typed client for the backend's current-user endpoint.
#[derive(Debug, Clone)]
pub struct ProfileClient {
    backend: BackendClient,
}

impl ProfileClient {
    /// Creates a profile client on top of the shared backend client.
    #[must_use]
    pub fn new(backend: BackendClient) -> Self {
        Self { backend }
    }

    /// Fetches the current admin's profile.
    ///
    /// The profile decorates every page, so failures degrade to `None`
    /// rather than failing the request. Session expiry is the exception and must
    /// surface so the web layer can redirect to login.
    pub async fn fetch_current_profile(
        &self,
        ctx: &ApiContext,
    ) -> Result<Option<AdminProfile>, ApiError> {
        if ctx.access_token().is_none() {
            return Ok(None);
        }

        let request = self.backend.request(Method::GET, &["user", "me"])?;
        match self
            .backend
            .expect_json::<UserProfileResponse>(ctx, request)
            .await
        {
            Ok(response) => Ok(Some(AdminProfile {
                nickname: response.nickname,
                email: response.email,
                profile_image_url: response.profile_image_url,
                roles: normalize_roles(response.roles.unwrap_or_default()),
            })),
            Err(ApiError::AuthExpired) => Err(ApiError::AuthExpired),
            Err(err) => {
                warn!(%err, "failed to fetch current admin profile");
                Ok(None)
            }
        }
    }
}

fn normalize_roles(roles: Vec<String>) -> Vec<String> {
    let mut normalized: Vec<String> = Vec::new();
    for role in roles {
        let role = role.trim().to_uppercase();
        if role.is_empty() || normalized.contains(&role) {
            continue;
        }
        normalized.push(role);
    }
    normalized
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct UserProfileResponse {
    nickname: Option<String>,
    email: Option<String>,
    profile_image_url: Option<String>,
    roles: Option<Vec<String>>,
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

    fn client_and_ctx(server: &Server, token: Option<&str>) -> (ProfileClient, ApiContext) {
        let props = crate::ApiProps::new(server.url_str("/"), None).expect("valid props");
        let backend = BackendClient::new(&props).expect("client builds");
        let store = Arc::new(SessionStore::new(Duration::minutes(30)));
        let id = store.create();
        if let Some(token) = token {
            store.establish(&id, LoginSession::new(token).expect("valid token"));
        }
        (ProfileClient::new(backend), ApiContext::new(store, id))
    }

    #[tokio::test]
    async fn no_token_short_circuits_without_a_request() {
        let server = Server::run();
        let (client, ctx) = client_and_ctx(&server, None);

        let profile = client
            .fetch_current_profile(&ctx)
            .await
            .expect("no error without a token");
        assert!(profile.is_none());
    }

    #[tokio::test]
    async fn profile_roles_are_normalized() {
        let server = Server::run();
        server.expect(
            Expectation::matching(request::method_path("GET", "/user/me")).respond_with(
                json_encoded(json!({
                    "nickname": "staff",
                    "email": "staff@example.com",
                    "profileImageUrl": null,
                    "roles": ["admin_viewer", "ADMIN_VIEWER", " ", "ADMIN_EDITOR"]
                })),
            ),
        );

        let (client, ctx) = client_and_ctx(&server, Some("token"));
        let profile = client
            .fetch_current_profile(&ctx)
            .await
            .expect("fetch succeeds")
            .expect("profile present");

        assert_eq!(profile.nickname.as_deref(), Some("staff"));
        assert_eq!(profile.roles, ["ADMIN_VIEWER", "ADMIN_EDITOR"]);
    }

    #[tokio::test]
    async fn backend_failure_degrades_to_none() {
        let server = Server::run();
        server.expect(
            Expectation::matching(request::method_path("GET", "/user/me"))
                .respond_with(status_code(500)),
        );

        let (client, ctx) = client_and_ctx(&server, Some("token"));
        let profile = client
            .fetch_current_profile(&ctx)
            .await
            .expect("degrades instead of failing");
        assert!(profile.is_none());
    }
}
