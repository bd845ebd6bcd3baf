//! Authentication routes: login bootstrap, social callbacks, logout.

use super::middleware::{
    current_session, ensure_session, refresh_removal_cookie, session_removal_cookie,
};
use super::AppState;
use axum::extract::{Query, State};
use axum::{Form, Json};
use axum::http::{HeaderValue, header};
use axum::response::{IntoResponse, Redirect, Response};
use axum_extra::extract::CookieJar;
use saerok_admin_backend::{ApiError, LoginSuccess};
use saerok_admin_session::{LoginSession, SessionId};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info, warn};

/// Which social provider a callback came from.
#[derive(Debug, Clone, Copy)]
enum Provider {
    Kakao,
    Apple,
}

impl Provider {
    fn name(self) -> &'static str {
        match self {
            Self::Kakao => "kakao",
            Self::Apple => "apple",
        }
    }
}

/// Query parameters for the login page.
#[derive(Debug, Deserialize)]
pub struct LoginPageQuery {
    error: Option<String>,
    message: Option<String>,
}

/// Query/form parameters for the OAuth callbacks.
///
/// Both are optional so a malformed callback can be answered with a
/// redirect instead of a 400.
#[derive(Debug, Deserialize)]
pub struct CallbackParams {
    code: Option<String>,
    state: Option<String>,
}

/// View model for the login page shell.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginView {
    kakao_auth_url: String,
    apple_auth_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<LoginError>,
}

/// A resolved login error to show the admin.
#[derive(Debug, PartialEq, Eq, Serialize)]
pub struct LoginError {
    code: String,
    title: String,
    message: String,
}

/// Serves the login view: ensures a session with an OAuth state token and
/// returns the provider authorize URLs (plus any login error to display).
pub async fn login(
    State(state): State<Arc<AppState>>,
    Query(query): Query<LoginPageQuery>,
    jar: CookieJar,
) -> impl IntoResponse {
    let (session_id, jar) = ensure_session(&state, jar);
    let state_token = reuse_or_create_state(&state, &session_id);

    let view = LoginView {
        kakao_auth_url: state.oauth.kakao_authorize_url(&state_token),
        apple_auth_url: state.oauth.apple_authorize_url(&state_token),
        error: resolve_login_error(query.error.as_deref(), query.message.as_deref()),
    };

    (jar, Json(view))
}

/// Redirects straight to Kakao's authorize page.
pub async fn login_kakao(State(state): State<Arc<AppState>>, jar: CookieJar) -> impl IntoResponse {
    let (session_id, jar) = ensure_session(&state, jar);
    let state_token = reuse_or_create_state(&state, &session_id);
    let url = state.oauth.kakao_authorize_url(&state_token);
    (jar, Redirect::to(&url))
}

/// Redirects straight to Apple's authorize page.
pub async fn login_apple(State(state): State<Arc<AppState>>, jar: CookieJar) -> impl IntoResponse {
    let (session_id, jar) = ensure_session(&state, jar);
    let state_token = reuse_or_create_state(&state, &session_id);
    let url = state.oauth.apple_authorize_url(&state_token);
    (jar, Redirect::to(&url))
}

/// Handles the Kakao OAuth callback.
pub async fn kakao_callback(
    State(state): State<Arc<AppState>>,
    Query(params): Query<CallbackParams>,
    jar: CookieJar,
) -> Response {
    handle_social_callback(&state, &jar, params, Provider::Kakao).await
}

/// Handles the Apple OAuth callback delivered as a GET.
pub async fn apple_callback_get(
    State(state): State<Arc<AppState>>,
    Query(params): Query<CallbackParams>,
    jar: CookieJar,
) -> Response {
    handle_social_callback(&state, &jar, params, Provider::Apple).await
}

/// Handles the Apple OAuth callback delivered as a form post
/// (`response_mode=form_post`).
pub async fn apple_callback_post(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Form(params): Form<CallbackParams>,
) -> Response {
    handle_social_callback(&state, &jar, params, Provider::Apple).await
}

async fn handle_social_callback(
    state: &AppState,
    jar: &CookieJar,
    params: CallbackParams,
    provider: Provider,
) -> Response {
    let Some(session_id) = current_session(state, jar) else {
        warn!(
            provider = provider.name(),
            "OAuth callback without an existing session"
        );
        return Redirect::to("/login?error=session").into_response();
    };

    let code = params.code.filter(|code| !code.trim().is_empty());
    let state_param = params.state.filter(|s| !s.trim().is_empty());
    let (Some(code), Some(state_param)) = (code, state_param) else {
        warn!(
            provider = provider.name(),
            "OAuth callback missing code or state"
        );
        return Redirect::to("/login?error=callback").into_response();
    };

    if !state.sessions.consume_state(&session_id, &state_param) {
        warn!(
            provider = provider.name(),
            session = %session_id,
            "OAuth state validation failed"
        );
        return Redirect::to("/login?error=state").into_response();
    }

    info!(provider = provider.name(), session = %session_id, "processing social login");
    let result = match provider {
        Provider::Kakao => state.backend.auth().kakao_login(&code).await,
        Provider::Apple => state.backend.auth().apple_login(&code).await,
    };

    match result {
        Ok(success) => establish_login(state, &session_id, &success),
        Err(err) => {
            error!(provider = provider.name(), %err, "social login failed");
            state.sessions.clear_login(&session_id);
            Redirect::to(&login_failure_location(&err)).into_response()
        }
    }
}

fn establish_login(state: &AppState, session_id: &SessionId, success: &LoginSuccess) -> Response {
    // The token was validated at LoginSuccess construction; a failure here
    // would mean the invariant broke, so fall back to the login error flow.
    let login = match LoginSession::new(success.access_token()) {
        Ok(login) => login,
        Err(err) => {
            error!(%err, "login succeeded but produced an unusable token");
            return Redirect::to("/login?error=login").into_response();
        }
    };
    state.sessions.establish(session_id, login);
    info!(session = %session_id, "social login established");

    let mut response = Redirect::to("/").into_response();
    append_set_cookies(&mut response, success.refresh_cookies());
    response
}

/// Appends backend `Set-Cookie` values to the response verbatim, preserving
/// the backend's own cookie attributes.
pub fn append_set_cookies(response: &mut Response, cookies: &[String]) {
    for cookie in cookies {
        match HeaderValue::from_str(cookie) {
            Ok(value) => {
                response.headers_mut().append(header::SET_COOKIE, value);
            }
            Err(_) => warn!("dropping refresh cookie with invalid header characters"),
        }
    }
}

/// Logs the admin out: drops the session and expires both cookies.
pub async fn logout(State(state): State<Arc<AppState>>, jar: CookieJar) -> impl IntoResponse {
    if let Some(cookie) = jar.get(super::middleware::SESSION_COOKIE) {
        state.sessions.remove(&SessionId::from(cookie.value()));
    }

    let jar = jar
        .add(session_removal_cookie())
        .add(refresh_removal_cookie(state.session_config.secure_cookies));

    (jar, Redirect::to("/login"))
}

fn reuse_or_create_state(state: &AppState, session_id: &SessionId) -> String {
    state
        .sessions
        .oauth_state(session_id)
        .unwrap_or_else(|| state.sessions.create_state(session_id))
}

/// Builds the login-failure redirect, carrying the backend's error message
/// when the failure body had one.
fn login_failure_location(err: &ApiError) -> String {
    let mut url =
        reqwest::Url::parse("http://admin.invalid/login").expect("static login URL parses");
    url.query_pairs_mut().append_pair("error", "login");
    if let Some(message) = err.backend_message() {
        url.query_pairs_mut().append_pair("message", &message);
    }
    match url.query() {
        Some(query) => format!("{}?{}", url.path(), query),
        None => url.path().to_string(),
    }
}

fn resolve_login_error(code: Option<&str>, backend_message: Option<&str>) -> Option<LoginError> {
    let code = code?.trim();
    if code.is_empty() {
        return None;
    }

    let (title, message) = match code {
        "session" => (
            "Session error",
            "Your login session has expired. Please log in again.".to_string(),
        ),
        "callback" => (
            "Login failed",
            "The login response was missing required information. Please try again.".to_string(),
        ),
        "state" => (
            "Login failed",
            "The login request has expired. Please try again.".to_string(),
        ),
        "login" => (
            "Login failed",
            backend_message
                .filter(|message| !message.trim().is_empty())
                .map(str::to_string)
                .unwrap_or_else(|| {
                    "Something went wrong during login. Please try again later.".to_string()
                }),
        ),
        _ => (
            "Login failed",
            "Login failed. Please try again.".to_string(),
        ),
    };

    Some(LoginError {
        code: code.to_string(),
        title: title.to_string(),
        message,
    })
}
