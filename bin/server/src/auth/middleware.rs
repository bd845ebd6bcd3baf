//! Session cookie plumbing and authentication extractors for axum.

use super::AppState;
use axum::extract::{FromRef, FromRequestParts};
use axum::http::request::Parts;
use axum::response::{IntoResponse, Redirect, Response};
use axum_extra::extract::CookieJar;
use axum_extra::extract::cookie::{Cookie, SameSite};
use saerok_admin_backend::{ApiContext, REFRESH_COOKIE_NAME};
use saerok_admin_session::SessionId;
use std::sync::Arc;
use time::Duration as TimeDuration;

/// Session cookie name.
pub const SESSION_COOKIE: &str = "admin_session";

/// Returns the live session referenced by the request's cookie, if any.
pub fn current_session(state: &AppState, jar: &CookieJar) -> Option<SessionId> {
    let cookie = jar.get(SESSION_COOKIE)?;
    let id = SessionId::from(cookie.value());
    state.sessions.exists(&id).then_some(id)
}

/// Returns the request's session, creating one (and its cookie) if needed.
pub fn ensure_session(state: &AppState, jar: CookieJar) -> (SessionId, CookieJar) {
    if let Some(id) = current_session(state, &jar) {
        return (id, jar);
    }
    let id = state.sessions.create();
    let cookie = session_cookie(&id, state.session_config.secure_cookies);
    (id, jar.add(cookie))
}

/// Builds the per-request backend call context for a session, carrying the
/// inbound `refreshToken` cookie value when the browser sent one.
pub fn api_context(state: &AppState, jar: &CookieJar, session_id: SessionId) -> ApiContext {
    let ctx = ApiContext::new(state.sessions.clone(), session_id);
    match jar.get(REFRESH_COOKIE_NAME) {
        Some(cookie) => ctx.with_refresh_cookie(cookie.value()),
        None => ctx,
    }
}

/// Builds the session cookie.
fn session_cookie(id: &SessionId, secure: bool) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, id.as_str().to_string()))
        .path("/")
        .http_only(true)
        .secure(secure)
        .same_site(SameSite::Lax)
        .build()
}

/// Builds an expiring cookie that deletes the session cookie browser-side.
pub fn session_removal_cookie() -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, ""))
        .path("/")
        .max_age(TimeDuration::ZERO)
        .build()
}

/// Builds an expiring `refreshToken` cookie to force browser-side deletion
/// on logout. The secure flag mirrors the deployment's cookie security.
pub fn refresh_removal_cookie(secure: bool) -> Cookie<'static> {
    Cookie::build((REFRESH_COOKIE_NAME, ""))
        .path("/")
        .http_only(true)
        .secure(secure)
        .max_age(TimeDuration::ZERO)
        .build()
}

/// Extractor requiring a logged-in admin session.
///
/// Yields the request's backend call context. Unauthenticated requests are
/// redirected to the login page.
pub struct RequireAuth(pub ApiContext);

impl<S> FromRequestParts<S> for RequireAuth
where
    Arc<AppState>: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let app_state = Arc::<AppState>::from_ref(state);
        let jar = CookieJar::from_request_parts(parts, state)
            .await
            .map_err(|_| AuthRejection::NotAuthenticated)?;

        let session_cookie = jar
            .get(SESSION_COOKIE)
            .ok_or(AuthRejection::NotAuthenticated)?;
        let session_id = SessionId::from(session_cookie.value());

        if app_state.sessions.login(&session_id).is_none() {
            return Err(AuthRejection::NotAuthenticated);
        }

        Ok(RequireAuth(api_context(&app_state, &jar, session_id)))
    }
}

/// Rejection type for authentication extractors.
#[derive(Debug)]
pub enum AuthRejection {
    NotAuthenticated,
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        match self {
            Self::NotAuthenticated => Redirect::to("/login").into_response(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_cookie_is_http_only_and_scoped_to_root() {
        let id = SessionId::generate();
        let cookie = session_cookie(&id, true);

        assert_eq!(cookie.name(), SESSION_COOKIE);
        assert_eq!(cookie.value(), id.as_str());
        assert_eq!(cookie.path(), Some("/"));
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.secure(), Some(true));
        assert_eq!(cookie.same_site(), Some(SameSite::Lax));
    }

    #[test]
    fn refresh_removal_cookie_expires_immediately() {
        let cookie = refresh_removal_cookie(false);

        assert_eq!(cookie.name(), REFRESH_COOKIE_NAME);
        assert_eq!(cookie.value(), "");
        assert_eq!(cookie.max_age(), Some(TimeDuration::ZERO));
        assert_eq!(cookie.path(), Some("/"));
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.secure(), Some(false));
    }
}
