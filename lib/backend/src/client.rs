//! Authorized backend API client.
//!
//! [`BackendClient`] wraps every outbound call to the backend API with
//! implicit authentication: it attaches the session's bearer token and
//! transparently recovers from a single expired-token 401 by refreshing and
//! retrying exactly once. Callers never observe the intermediate 401: they
//! get either a final response or [`ApiError::AuthExpired`].
//!
//! Requests whose path contains `/auth/` pass through untouched so that the
//! auth bootstrap endpoints can never recursively trigger a refresh.

use crate::auth::BackendAuthClient;
use crate::context::ApiContext;
use crate::error::ApiError;
use crate::props::ApiProps;
use reqwest::{Method, StatusCode, Url};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

/// One outbound backend API call: method, resolved URL and optional JSON
/// body. Kept as a template (rather than a built request) so the
/// authorization layer can execute it more than once with different headers.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    method: Method,
    url: Url,
    body: Option<serde_json::Value>,
}

impl ApiRequest {
    /// Appends a query parameter.
    #[must_use]
    pub fn with_query(mut self, key: &str, value: &str) -> Self {
        self.url.query_pairs_mut().append_pair(key, value);
        self
    }

    /// Attaches a JSON body.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::InvalidRequest`] if the body cannot be
    /// serialized.
    pub fn with_json<T: Serialize>(mut self, body: &T) -> Result<Self, ApiError> {
        self.body = Some(
            serde_json::to_value(body).map_err(|e| ApiError::InvalidRequest {
                details: e.to_string(),
            })?,
        );
        Ok(self)
    }

    /// Returns the resolved request URL.
    #[must_use]
    pub fn url(&self) -> &Url {
        &self.url
    }

    fn is_auth_request(&self) -> bool {
        self.url.path().contains("/auth/")
    }
}

/// HTTP client for the backend API with transparent token refresh.
#[derive(Debug, Clone)]
pub struct BackendClient {
    http: reqwest::Client,
    base_url: Url,
    missing_prefix: Vec<String>,
    auth: BackendAuthClient,
}

impl BackendClient {
    /// Creates a client for the configured backend.
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL is unusable or the underlying HTTP
    /// client cannot be built.
    pub fn new(props: &ApiProps) -> Result<Self, ApiError> {
        let base_url = Url::parse(props.base_url()).map_err(|e| ApiError::InvalidRequest {
            details: format!("backend base URL is not a valid URL: {e}"),
        })?;
        if base_url.cannot_be_a_base() {
            return Err(ApiError::InvalidRequest {
                details: "backend base URL cannot carry request paths".to_string(),
            });
        }
        let http = reqwest::Client::builder()
            .build()
            .map_err(|e| ApiError::Transport {
                details: e.to_string(),
            })?;
        Ok(Self {
            http,
            base_url,
            missing_prefix: props.missing_prefix_segments().to_vec(),
            auth: BackendAuthClient::new(props)?,
        })
    }

    /// Returns the auth client sharing this configuration.
    #[must_use]
    pub fn auth(&self) -> &BackendAuthClient {
        &self.auth
    }

    /// Builds a request for an admin API path, injecting the configured
    /// prefix segments when the base URL does not already carry them.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::InvalidRequest`] for an unusable base URL.
    pub fn request(&self, method: Method, segments: &[&str]) -> Result<ApiRequest, ApiError> {
        let prefix: Vec<&str> = self.missing_prefix.iter().map(String::as_str).collect();
        self.build_request(method, &prefix, segments)
    }

    /// Builds a request resolved directly against the base URL, without
    /// prefix injection (the health endpoint lives there).
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::InvalidRequest`] for an unusable base URL.
    pub fn request_unprefixed(
        &self,
        method: Method,
        segments: &[&str],
    ) -> Result<ApiRequest, ApiError> {
        self.build_request(method, &[], segments)
    }

    fn build_request(
        &self,
        method: Method,
        prefix: &[&str],
        segments: &[&str],
    ) -> Result<ApiRequest, ApiError> {
        let mut url = self.base_url.clone();
        {
            let mut path = url
                .path_segments_mut()
                .map_err(|()| ApiError::InvalidRequest {
                    details: "backend base URL cannot carry request paths".to_string(),
                })?;
            path.pop_if_empty();
            path.extend(prefix);
            path.extend(segments);
        }
        Ok(ApiRequest {
            method,
            url,
            body: None,
        })
    }

    /// Executes a request with implicit authentication and at most one
    /// refresh-and-retry cycle.
    ///
    /// - Auth-bootstrap paths (containing `/auth/`) pass through unmodified.
    /// - With no current token the request is sent bare; a 401 then triggers
    ///   one bare re-execution (there is nothing to refresh).
    /// - A 401 with a token triggers one refresh. Refresh failure clears the
    ///   login and fails with [`ApiError::AuthExpired`] without retrying.
    ///   After a successful refresh the request is retried exactly once; a
    ///   second 401 clears the login and fails the same way.
    ///
    /// Session mutation (token update, cookie buffering) happens only on a
    /// successful refresh, always before any error is returned.
    ///
    /// # Errors
    ///
    /// [`ApiError::AuthExpired`] per the above; [`ApiError::Transport`] for
    /// connection-level failures, which are never retried.
    pub async fn execute(
        &self,
        ctx: &ApiContext,
        request: ApiRequest,
    ) -> Result<reqwest::Response, ApiError> {
        if request.is_auth_request() {
            return self.dispatch(&request, None).await;
        }

        let response = self
            .dispatch(&request, ctx.access_token().as_deref())
            .await?;
        if response.status() != StatusCode::UNAUTHORIZED {
            return Ok(response);
        }

        debug!(path = request.url.path(), "backend returned 401, attempting token refresh");
        drop(response);
        self.retry_with_refreshed_token(ctx, &request).await
    }

    async fn retry_with_refreshed_token(
        &self,
        ctx: &ApiContext,
        request: &ApiRequest,
    ) -> Result<reqwest::Response, ApiError> {
        if ctx.access_token().is_none() {
            // Nothing to refresh; re-execute the original request untouched.
            return self.dispatch(request, None).await;
        }

        let refreshed = match self.auth.refresh_access_token(ctx.refresh_cookie()).await {
            Ok(tokens) => tokens,
            Err(err) => {
                warn!(%err, "access token refresh failed, clearing session");
                ctx.clear_login();
                return Err(ApiError::AuthExpired);
            }
        };

        ctx.update_access_token(refreshed.access_token());
        ctx.push_set_cookies(refreshed.refresh_cookies());

        let retry = self
            .dispatch(request, ctx.access_token().as_deref())
            .await?;
        if retry.status() == StatusCode::UNAUTHORIZED {
            warn!(path = request.url.path(), "still unauthorized after refresh, clearing session");
            ctx.clear_login();
            return Err(ApiError::AuthExpired);
        }
        Ok(retry)
    }

    async fn dispatch(
        &self,
        request: &ApiRequest,
        bearer: Option<&str>,
    ) -> Result<reqwest::Response, ApiError> {
        // Headers are assembled fresh per attempt; the template itself is
        // never mutated, so a retry cannot inherit a stale Authorization
        // header.
        let mut builder = self.http.request(request.method.clone(), request.url.clone());
        if let Some(token) = bearer {
            builder = builder.bearer_auth(token);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }
        builder.send().await.map_err(|e| ApiError::Transport {
            details: e.to_string(),
        })
    }

    /// Executes a request and decodes a required JSON body.
    pub(crate) async fn expect_json<T: DeserializeOwned>(
        &self,
        ctx: &ApiContext,
        request: ApiRequest,
    ) -> Result<T, ApiError> {
        let response = self.execute(ctx, request).await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::Status {
                status: status.as_u16(),
                body,
            });
        }
        response
            .json::<T>()
            .await
            .map_err(|e| ApiError::InvalidResponse {
                details: e.to_string(),
            })
    }

    /// Executes a request, requiring a success status and ignoring the body.
    pub(crate) async fn expect_success(
        &self,
        ctx: &ApiContext,
        request: ApiRequest,
    ) -> Result<(), ApiError> {
        let response = self.execute(ctx, request).await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::Status {
                status: status.as_u16(),
                body,
            });
        }
        Ok(())
    }
}
