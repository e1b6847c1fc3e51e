//! GitHub OAuth client.
//!
//! Provides a configured GitHub OAuth provider for the login handlers.

use provider_auth::http::{HttpClient, HttpClientBuilder};
use provider_auth::oauth::providers::github::{GitHubUrls, Provider as GitHubProvider};
use secrecy::SecretString;
use service::config::Config;

use crate::error::Error;

/// Build the outbound HTTP client shared by the provider and contents clients.
pub fn http_client(config: &Config) -> Result<HttpClient, Error> {
    Ok(HttpClientBuilder::new()
        .with_timeout(config.http_timeout())
        .build()?)
}

/// Create a new GitHub OAuth provider.
///
/// # Arguments
///
/// * `config` - Supplies the client id, redirect URI, scope and endpoint URLs
/// * `client_secret` - OAuth app client secret. Authorization-URL-only callers may
///   pass an empty secret since it is only sent during the code exchange.
///
/// # Example
///
/// ```rust,ignore
/// use domain::gateway::oauth::github;
///
/// let provider = github::new_provider(&config, config.provider_client_secret().unwrap())?;
/// ```
pub fn new_provider(config: &Config, client_secret: SecretString) -> Result<GitHubProvider, Error> {
    let client_id = config
        .provider_client_id()
        .ok_or_else(|| Error::config("GitHub Client ID not configured"))?;

    let urls = GitHubUrls {
        authorize_url: config.provider_authorize_url().to_string(),
        token_url: config.provider_token_url().to_string(),
        api_base_url: config.provider_api_base_url().to_string(),
    };

    Ok(GitHubProvider::new(
        client_id,
        client_secret,
        config.redirect_uri().unwrap_or_default(),
        config.oauth_scope().to_string(),
        urls,
        http_client(config)?,
    ))
}
