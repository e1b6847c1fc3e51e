//! CSRF state tokens for the authorization redirect.
//!
//! The token is issued with the redirect, round-tripped through the browser in an
//! HTTP-only cookie, and compared with the `state` query parameter on the callback.

use rand::{rngs::OsRng, RngCore};

use crate::error::{oauth_error, Error, OAuthErrorKind};

/// Name of the cookie carrying the issued state token.
pub const STATE_COOKIE_NAME: &str = "oauth_state";

/// Lifetime of the state cookie (10 minutes).
pub const STATE_TTL_SECONDS: u64 = 600;

/// An opaque, unpredictable CSRF token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateToken(String);

impl StateToken {
    /// Generate a new token from 32 bytes of operating system randomness, hex encoded.
    pub fn generate() -> Self {
        let mut random_bytes = [0u8; 32];
        OsRng.fill_bytes(&mut random_bytes);
        Self(hex::encode(random_bytes))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for StateToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Check the `state` returned on the callback against the value held in the cookie.
///
/// Both must be present and byte-for-byte equal.
pub fn verify_state(query_state: Option<&str>, cookie_state: Option<&str>) -> Result<(), Error> {
    match (query_state, cookie_state) {
        (Some(query), Some(cookie)) if !query.is_empty() && query.as_bytes() == cookie.as_bytes() => {
            Ok(())
        }
        (None, _) => Err(oauth_error(
            OAuthErrorKind::InvalidState,
            "state parameter missing from callback",
        )),
        (_, None) => Err(oauth_error(
            OAuthErrorKind::InvalidState,
            "state cookie missing or expired",
        )),
        _ => Err(oauth_error(
            OAuthErrorKind::InvalidState,
            "state parameter does not match cookie",
        )),
    }
}
