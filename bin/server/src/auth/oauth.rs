//! Social login authorize-URL construction.
//!
//! The console never exchanges OAuth codes with the providers itself; the
//! backend does that. This module only builds the authorize URLs the login
//! page links to, with the session's CSRF state token embedded.

use crate::config::{ProviderConfig, SocialLoginConfig};
use oauth2::basic::BasicClient;
use oauth2::{AuthUrl, ClientId, CsrfToken, RedirectUrl, Scope};
use std::fmt;

/// Kakao OAuth authorization URL.
const KAKAO_AUTH_URL: &str = "https://kauth.kakao.com/oauth/authorize";

/// Apple OAuth authorization URL.
const APPLE_AUTH_URL: &str = "https://appleid.apple.com/auth/authorize";

/// Kakao OAuth scopes.
const KAKAO_SCOPES: &[&str] = &["openid", "account_email"];

/// Apple OAuth scopes.
const APPLE_SCOPES: &[&str] = &["openid", "email", "name"];

/// Builds provider authorize URLs from validated configuration.
#[derive(Debug, Clone)]
pub struct SocialLoginUrls {
    kakao: ProviderConfig,
    apple: ProviderConfig,
}

impl SocialLoginUrls {
    /// Validates the configured redirect URIs and returns the builder.
    ///
    /// # Errors
    ///
    /// Returns an error if either provider's redirect URI is not a valid
    /// URL.
    pub fn new(config: &SocialLoginConfig) -> Result<Self, InvalidOauthConfig> {
        for (provider, settings) in [("kakao", &config.kakao), ("apple", &config.apple)] {
            RedirectUrl::new(settings.redirect_uri.clone()).map_err(|e| InvalidOauthConfig {
                details: format!("invalid {provider} redirect URI: {e}"),
            })?;
        }
        Ok(Self {
            kakao: config.kakao.clone(),
            apple: config.apple.clone(),
        })
    }

    /// Returns the Kakao authorize URL carrying the given state token.
    #[must_use]
    pub fn kakao_authorize_url(&self, state: &str) -> String {
        authorize_url(KAKAO_AUTH_URL, &self.kakao, state, KAKAO_SCOPES, &[])
    }

    /// Returns the Apple authorize URL carrying the given state token.
    ///
    /// Apple posts the callback as a form (`response_mode=form_post`).
    #[must_use]
    pub fn apple_authorize_url(&self, state: &str) -> String {
        authorize_url(
            APPLE_AUTH_URL,
            &self.apple,
            state,
            APPLE_SCOPES,
            &[("response_mode", "form_post")],
        )
    }
}

fn authorize_url(
    auth_url: &str,
    provider: &ProviderConfig,
    state: &str,
    scopes: &[&str],
    extra_params: &[(&str, &str)],
) -> String {
    let client = BasicClient::new(ClientId::new(provider.client_id.clone()))
        .set_auth_uri(AuthUrl::new(auth_url.to_string()).expect("valid authorize URL"))
        .set_redirect_uri(
            RedirectUrl::new(provider.redirect_uri.clone()).expect("redirect URI validated at startup"),
        );

    let state = state.to_string();
    let mut request = client.authorize_url(move || CsrfToken::new(state));
    for scope in scopes {
        request = request.add_scope(Scope::new((*scope).to_string()));
    }
    for (key, value) in extra_params {
        request = request.add_extra_param(*key, *value);
    }

    let (url, _csrf_token) = request.url();
    url.to_string()
}

/// Error returned for unusable social login configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidOauthConfig {
    /// What was wrong with the configuration.
    pub details: String,
}

impl fmt::Display for InvalidOauthConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid social login configuration: {}", self.details)
    }
}

impl std::error::Error for InvalidOauthConfig {}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> SocialLoginConfig {
        SocialLoginConfig {
            kakao: ProviderConfig {
                client_id: "kakao-client".to_string(),
                redirect_uri: "https://admin.example.com/auth/callback/kakao".to_string(),
            },
            apple: ProviderConfig {
                client_id: "apple-client".to_string(),
                redirect_uri: "https://admin.example.com/auth/callback/apple".to_string(),
            },
        }
    }

    #[test]
    fn kakao_url_carries_client_and_state() {
        let urls = SocialLoginUrls::new(&config()).expect("valid config");
        let url = urls.kakao_authorize_url("state-token");

        assert!(url.starts_with(KAKAO_AUTH_URL));
        assert!(url.contains("response_type=code"));
        assert!(url.contains("client_id=kakao-client"));
        assert!(url.contains("state=state-token"));
        assert!(url.contains("account_email"));
    }

    #[test]
    fn apple_url_requests_form_post_callback() {
        let urls = SocialLoginUrls::new(&config()).expect("valid config");
        let url = urls.apple_authorize_url("state-token");

        assert!(url.starts_with(APPLE_AUTH_URL));
        assert!(url.contains("response_mode=form_post"));
        assert!(url.contains("client_id=apple-client"));
        assert!(url.contains("state=state-token"));
    }

    #[test]
    fn invalid_redirect_uri_is_rejected() {
        let mut config = config();
        config.apple.redirect_uri = "not a url".to_string();
        assert!(SocialLoginUrls::new(&config).is_err());
    }
}
