//! OAuth provider trait and types.

use async_trait::async_trait;

use super::{AccessToken, StateToken};
use crate::error::{oauth_error, Error, OAuthErrorKind};

/// Known source-control OAuth providers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderKind {
    GitHub,
}

impl ProviderKind {
    /// Human readable provider name.
    pub fn display_name(&self) -> &'static str {
        match self {
            ProviderKind::GitHub => "GitHub",
        }
    }
}

/// Authorization request with the URL to redirect to and the state it carries.
#[derive(Debug, Clone)]
pub struct AuthorizationRequest {
    /// Authorization URL to redirect the user to.
    pub url: String,
    /// CSRF state parameter embedded in `url`.
    pub state: StateToken,
}

/// User profile retrieved from the OAuth provider.
#[derive(Debug, Clone, PartialEq)]
pub struct UserInfo {
    /// Provider login handle, the key of the login audit.
    pub login: String,
    /// Display name.
    pub name: Option<String>,
    /// Profile picture URL.
    pub avatar_url: Option<String>,
    /// Public email address.
    pub email: Option<String>,
    /// The profile object exactly as the provider returned it.
    pub raw: serde_json::Value,
}

impl UserInfo {
    /// Build from the provider's profile JSON. `login` is required; the other fields
    /// are treated as absent when missing, null, or empty.
    pub fn from_json(raw: serde_json::Value) -> Result<Self, Error> {
        let field = |name: &str| {
            raw.get(name)
                .and_then(|v| v.as_str())
                .filter(|s| !s.is_empty())
                .map(str::to_string)
        };

        let login = field("login").ok_or_else(|| {
            oauth_error(
                OAuthErrorKind::InvalidResponse,
                "user profile is missing a login",
            )
        })?;

        Ok(Self {
            name: field("name"),
            avatar_url: field("avatar_url"),
            email: field("email"),
            login,
            raw,
        })
    }
}

/// Trait for OAuth 2.0 authorization-code providers.
///
/// Implementations handle platform-specific OAuth flows including:
/// - Authorization URL generation
/// - Authorization code exchange for an access token
/// - User profile retrieval
#[async_trait]
pub trait Provider: Send + Sync {
    /// Get the provider kind.
    fn provider(&self) -> ProviderKind;

    /// Generate the authorization URL carrying `state`.
    fn authorization_url(&self, state: StateToken) -> AuthorizationRequest;

    /// Exchange an authorization code for an access token.
    ///
    /// # Arguments
    ///
    /// * `code` - Authorization code from the OAuth callback
    ///
    /// # Returns
    ///
    /// The access token, or an `OAuthErrorKind::ProviderRejected` error carrying the
    /// provider's description when the provider refuses the code.
    async fn exchange_code(&self, code: &str) -> Result<AccessToken, Error>;

    /// Get the authenticated user's profile.
    async fn get_user_info(&self, access_token: &AccessToken) -> Result<UserInfo, Error>;
}
