//! Backend authentication client.
//!
//! Performs the three backend-facing auth calls: Kakao login, Apple login
//! and access-token refresh. Login and refresh share response handling
//! (extract the token, capture the `Set-Cookie` headers verbatim) but differ
//! in what goes onto the request: login posts the authorization code,
//! refresh forwards the browser's `refreshToken` cookie as a `Cookie`
//! header. The refresh endpoint never receives a bearer header.
//!
//! These calls deliberately bypass the authorization layer in
//! [`crate::BackendClient`]: a 401 from an auth endpoint must not trigger
//! another refresh.

use crate::error::ApiError;
use crate::props::ApiProps;
use reqwest::header;
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

/// Name of the backend's refresh cookie.
pub const REFRESH_COOKIE_NAME: &str = "refreshToken";

/// Client for the backend's authentication endpoints.
#[derive(Debug, Clone)]
pub struct BackendAuthClient {
    http: reqwest::Client,
    base_url: String,
}

impl BackendAuthClient {
    /// Creates an auth client for the configured backend.
    ///
    /// Auth paths are resolved against the base URL as configured; the
    /// path-prefix injection used by the admin clients does not apply here.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client cannot be built.
    pub fn new(props: &ApiProps) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .build()
            .map_err(|e| ApiError::Transport {
                details: e.to_string(),
            })?;
        Ok(Self {
            http,
            base_url: props.base_url().trim_end_matches('/').to_string(),
        })
    }

    /// Exchanges a Kakao authorization code for backend tokens.
    pub async fn kakao_login(&self, authorization_code: &str) -> Result<LoginSuccess, ApiError> {
        self.login("kakao", authorization_code).await
    }

    /// Exchanges an Apple authorization code for backend tokens.
    pub async fn apple_login(&self, authorization_code: &str) -> Result<LoginSuccess, ApiError> {
        self.login("apple", authorization_code).await
    }

    async fn login(&self, provider: &str, authorization_code: &str) -> Result<LoginSuccess, ApiError> {
        debug!(
            provider,
            code_len = authorization_code.len(),
            "requesting social login from backend"
        );
        let response = self
            .http
            .post(format!("{}/auth/{provider}/login", self.base_url))
            .json(&LoginPayload { authorization_code })
            .send()
            .await
            .map_err(|e| ApiError::Transport {
                details: e.to_string(),
            })?;
        to_login_success(response).await
    }

    /// Requests a fresh access token from the refresh endpoint.
    ///
    /// `refresh_cookie` is the raw value of the browser's `refreshToken`
    /// cookie; when present it is forwarded as a `Cookie` header, which is
    /// what the backend expects for this one call.
    pub async fn refresh_access_token(
        &self,
        refresh_cookie: Option<&str>,
    ) -> Result<LoginSuccess, ApiError> {
        let mut request = self.http.post(format!("{}/auth/refresh", self.base_url));
        if let Some(value) = refresh_cookie {
            request = request.header(header::COOKIE, format!("{REFRESH_COOKIE_NAME}={value}"));
        }
        let response = request.send().await.map_err(|e| ApiError::Transport {
            details: e.to_string(),
        })?;
        debug!("refresh token request completed");
        to_login_success(response).await
    }
}

async fn to_login_success(response: reqwest::Response) -> Result<LoginSuccess, ApiError> {
    let cookies: Vec<String> = response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .map(str::to_string)
        .collect();

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(ApiError::Status {
            status: status.as_u16(),
            body,
        });
    }

    let body: AccessTokenResponse =
        response
            .json()
            .await
            .map_err(|e| ApiError::InvalidAuthResponse {
                details: e.to_string(),
            })?;
    debug!(
        signup_status = body.signup_status.as_deref(),
        refresh_cookie_count = cookies.len(),
        "parsed backend auth response"
    );

    LoginSuccess::new(body.access_token.unwrap_or_default(), cookies).inspect_err(|err| {
        error!(%err, "backend auth response did not contain a usable access token");
    })
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct LoginPayload<'a> {
    authorization_code: &'a str,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct AccessTokenResponse {
    #[serde(default)]
    access_token: Option<String>,
    #[serde(default)]
    signup_status: Option<String>,
}

/// A successful backend auth exchange: the access token plus the raw
/// `Set-Cookie` values to forward to the browser.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginSuccess {
    access_token: String,
    refresh_cookies: Vec<String>,
}

impl LoginSuccess {
    /// Creates a login result.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::InvalidAuthResponse`] for a blank access token:
    /// a `LoginSuccess` with an empty token must never exist.
    pub fn new(
        access_token: impl Into<String>,
        refresh_cookies: Vec<String>,
    ) -> Result<Self, ApiError> {
        let access_token = access_token.into();
        if access_token.trim().is_empty() {
            return Err(ApiError::InvalidAuthResponse {
                details: "access token missing or empty".to_string(),
            });
        }
        Ok(Self {
            access_token,
            refresh_cookies,
        })
    }

    /// Returns the backend-issued access token (never empty).
    #[must_use]
    pub fn access_token(&self) -> &str {
        &self.access_token
    }

    /// Returns the raw `Set-Cookie` values from the backend response.
    #[must_use]
    pub fn refresh_cookies(&self) -> &[String] {
        &self.refresh_cookies
    }
}
