//! GitHub OAuth provider implementation.

use async_trait::async_trait;
use log::*;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use crate::error::{oauth_error, Error, OAuthErrorKind};
use crate::http::HttpClient;
use crate::oauth::{AccessToken, AuthorizationRequest, ProviderKind, StateToken, UserInfo};

pub const DEFAULT_AUTHORIZE_URL: &str = "https://github.com/login/oauth/authorize";
pub const DEFAULT_TOKEN_URL: &str = "https://github.com/login/oauth/access_token";
pub const DEFAULT_API_BASE_URL: &str = "https://api.github.com";

/// Media type GitHub recommends for REST API v3 requests.
pub const GITHUB_V3_MEDIA_TYPE: &str = "application/vnd.github.v3+json";

/// Message surfaced when the token endpoint reports an error without a description.
const DEFAULT_TOKEN_ERROR: &str = "Failed to get access token";

/// Configuration for GitHub OAuth URLs. Overridden in tests to point at a mock server.
#[derive(Debug, Clone)]
pub struct GitHubUrls {
    pub authorize_url: String,
    pub token_url: String,
    pub api_base_url: String,
}

impl Default for GitHubUrls {
    fn default() -> Self {
        Self {
            authorize_url: DEFAULT_AUTHORIZE_URL.to_string(),
            token_url: DEFAULT_TOKEN_URL.to_string(),
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
        }
    }
}

/// Request to exchange authorization code for an access token
#[derive(Debug, Serialize)]
struct TokenExchangeRequest<'a> {
    client_id: &'a str,
    client_secret: &'a str,
    code: &'a str,
}

/// GitHub answers the code exchange with either a token or an error pair,
/// usually with a 200 status in both cases.
#[derive(Debug, Deserialize)]
struct TokenExchangeResponse {
    access_token: Option<String>,
    error: Option<String>,
    error_description: Option<String>,
}

/// GitHub OAuth provider.
pub struct Provider {
    client_id: String,
    client_secret: SecretString,
    redirect_uri: String,
    scope: String,
    urls: GitHubUrls,
    http_client: HttpClient,
}

impl Provider {
    /// Create a new GitHub OAuth provider.
    ///
    /// # Arguments
    ///
    /// * `client_id` - OAuth app client ID
    /// * `client_secret` - OAuth app client secret
    /// * `redirect_uri` - Callback URL registered with the OAuth app
    /// * `scope` - Requested scope (e.g. `repo`)
    /// * `urls` - Authorize, token and API endpoints
    /// * `http_client` - Client used for the exchange and profile requests
    pub fn new(
        client_id: String,
        client_secret: SecretString,
        redirect_uri: String,
        scope: String,
        urls: GitHubUrls,
        http_client: HttpClient,
    ) -> Self {
        Self {
            client_id,
            client_secret,
            redirect_uri,
            scope,
            urls,
            http_client,
        }
    }

    fn user_url(&self) -> String {
        format!("{}/user", self.urls.api_base_url.trim_end_matches('/'))
    }
}

#[async_trait]
impl crate::oauth::Provider for Provider {
    fn provider(&self) -> ProviderKind {
        ProviderKind::GitHub
    }

    fn authorization_url(&self, state: StateToken) -> AuthorizationRequest {
        let url = format!(
            "{}?client_id={}&redirect_uri={}&scope={}&state={}",
            self.urls.authorize_url,
            urlencoding::encode(&self.client_id),
            urlencoding::encode(&self.redirect_uri),
            urlencoding::encode(&self.scope),
            urlencoding::encode(state.as_str())
        );

        AuthorizationRequest { url, state }
    }

    async fn exchange_code(&self, code: &str) -> Result<AccessToken, Error> {
        let request = TokenExchangeRequest {
            client_id: &self.client_id,
            client_secret: self.client_secret.expose_secret(),
            code,
        };

        debug!("Exchanging GitHub OAuth code for an access token");

        let response = self
            .http_client
            .post(&self.urls.token_url)
            .header(reqwest::header::ACCEPT, "application/json")
            .json(&request)
            .send()
            .await
            .inspect_err(|e| warn!("Failed to reach GitHub token endpoint: {:?}", e))?;

        let status = response.status();
        let body = response.text().await?;

        let parsed: Option<TokenExchangeResponse> = serde_json::from_str(&body).ok();

        if let Some(error) = parsed.as_ref().and_then(|p| p.error.as_deref()) {
            let description = parsed
                .as_ref()
                .and_then(|p| p.error_description.clone())
                .unwrap_or_else(|| DEFAULT_TOKEN_ERROR.to_string());
            warn!("GitHub rejected the authorization code: {} ({})", error, description);
            return Err(Error {
                source: Some(format!("token endpoint returned error `{error}`").into()),
                error_kind: crate::ErrorKind::OAuth(OAuthErrorKind::ProviderRejected(
                    description,
                )),
            });
        }

        if !status.is_success() {
            warn!("GitHub token endpoint returned {}", status);
            return Err(oauth_error(
                OAuthErrorKind::TokenExchangeFailed,
                &format!("token endpoint returned {status}"),
            ));
        }

        let parsed = parsed.ok_or_else(|| {
            warn!("Failed to parse GitHub token response");
            oauth_error(
                OAuthErrorKind::InvalidResponse,
                "token response is not valid JSON",
            )
        })?;

        let access_token = parsed
            .access_token
            .filter(|t| !t.is_empty())
            .ok_or_else(|| {
                oauth_error(
                    OAuthErrorKind::InvalidResponse,
                    "token response has no access_token",
                )
            })?;

        info!("Successfully exchanged GitHub OAuth code for an access token");

        Ok(AccessToken::new(SecretString::new(access_token)))
    }

    async fn get_user_info(&self, access_token: &AccessToken) -> Result<UserInfo, Error> {
        let response = self
            .http_client
            .get(self.user_url())
            .bearer_auth(access_token.secret())
            .header(reqwest::header::ACCEPT, GITHUB_V3_MEDIA_TYPE)
            .send()
            .await
            .inspect_err(|e| warn!("Failed to get GitHub user info: {:?}", e))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            warn!("GitHub user info error ({}): {}", status, error_text);
            return Err(oauth_error(
                OAuthErrorKind::UserInfoFailed,
                &format!("user endpoint returned {status}"),
            ));
        }

        let raw: serde_json::Value = response.json().await.map_err(|e| {
            warn!("Failed to parse GitHub user info: {:?}", e);
            Error {
                source: Some(Box::new(e)),
                error_kind: crate::ErrorKind::OAuth(OAuthErrorKind::InvalidResponse),
            }
        })?;

        UserInfo::from_json(raw)
    }
}
