//! The CSRF state cookie set by the authorize endpoint and read back on the callback.

use std::convert::Infallible;

use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts, HeaderMap},
};
use domain::gateway::oauth::{StateToken, STATE_COOKIE_NAME, STATE_TTL_SECONDS};

/// Value of the `oauth_state` cookie, if the browser sent one.
///
/// Never rejects; a missing cookie is a failed state check, which the callback reports.
pub(crate) struct OAuthStateCookie(pub Option<String>);

impl<S> FromRequestParts<S> for OAuthStateCookie
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(OAuthStateCookie(find_cookie(&parts.headers, STATE_COOKIE_NAME)))
    }
}

fn find_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, value)| *key == name && !value.is_empty())
        .map(|(_, value)| value.to_string())
}

/// `Set-Cookie` value pinning `state` to the browser for the duration of the consent screen.
pub(crate) fn state_cookie(state: &StateToken) -> String {
    format!(
        "{STATE_COOKIE_NAME}={}; Path=/; HttpOnly; Secure; SameSite=Lax; Max-Age={STATE_TTL_SECONDS}",
        state.as_str()
    )
}

/// `Set-Cookie` value expiring the state cookie once the callback consumed it.
pub(crate) fn clear_state_cookie() -> String {
    format!("{STATE_COOKIE_NAME}=; Path=/; HttpOnly; Secure; SameSite=Lax; Max-Age=0")
}
