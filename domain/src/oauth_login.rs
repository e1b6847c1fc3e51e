//! Authorization-code login against the GitHub OAuth app.
//!
//! `authorize_redirect` starts the flow, `verify_callback` rejects forged or incomplete
//! callbacks before anything touches the network, and `complete_login` performs the code
//! exchange, profile fetch and best-effort login audit.

use chrono::Utc;
use log::*;
use secrecy::SecretString;
use service::config::Config;

use crate::error::{DomainErrorKind, Error, RequestErrorKind};
use crate::gateway::github_contents::{GitHubContentsClient, Repository};
use crate::gateway::oauth::{self, github, AccessToken, Provider, StateToken, UserInfo};
use crate::login_audit::{self, LoginAuditRecord};

/// Where to send the browser, and the state token to pin in the cookie.
#[derive(Debug, Clone)]
pub struct AuthorizationRedirect {
    pub url: String,
    pub state: StateToken,
}

/// What happened to the login audit for a completed login.
#[derive(Debug, Clone, PartialEq)]
pub enum AuditOutcome {
    Recorded(LoginAuditRecord),
    /// The audit repository is not configured.
    Skipped,
    /// Reading or writing the audit document failed. Already logged.
    Failed,
}

#[derive(Debug, Clone)]
pub struct LoginOutcome {
    pub access_token: AccessToken,
    pub user: UserInfo,
    pub audit: AuditOutcome,
}

/// Build the provider authorization URL with a fresh state token.
pub fn authorize_redirect(config: &Config) -> Result<AuthorizationRedirect, Error> {
    if config.provider_client_id().is_none() {
        warn!("Authorization requested but no GitHub client id is configured");
        return Err(Error::config("GitHub Client ID not configured"));
    }
    if config.site_url().is_none() {
        warn!("Authorization requested but no site URL is configured");
        return Err(Error::config("Site URL not configured"));
    }

    // The secret is only sent during the code exchange.
    let provider = github::new_provider(config, SecretString::new(String::new()))?;
    let request = provider.authorization_url(StateToken::generate());

    debug!("Redirecting to {} authorization", provider.provider().display_name());
    Ok(AuthorizationRedirect {
        url: request.url,
        state: request.state,
    })
}

/// Validate the callback parameters and return the authorization code.
///
/// The state check runs first, so a forged callback is rejected as such even when it
/// also lacks a code.
pub fn verify_callback(
    query_state: Option<&str>,
    cookie_state: Option<&str>,
    code: Option<&str>,
) -> Result<String, Error> {
    oauth::verify_state(query_state, cookie_state)
        .inspect_err(|e| warn!("Rejecting OAuth callback: {}", e))?;

    code.filter(|c| !c.is_empty())
        .map(str::to_string)
        .ok_or_else(|| {
            warn!("Rejecting OAuth callback without an authorization code");
            Error {
                source: None,
                error_kind: DomainErrorKind::Request(RequestErrorKind::MissingCode),
            }
        })
}

/// Exchange `code` for an access token, fetch the user's profile and record the login.
///
/// Audit failures never fail the login; they are logged and reported as
/// [`AuditOutcome::Failed`].
pub async fn complete_login(config: &Config, code: &str) -> Result<LoginOutcome, Error> {
    let client_secret = config
        .provider_client_secret()
        .ok_or_else(|| Error::config("GitHub Client Secret not configured"))?;
    let provider = github::new_provider(config, client_secret)?;

    let access_token = provider
        .exchange_code(code)
        .await
        .inspect_err(|e| warn!("Failed to exchange OAuth code: {:?}", e))?;

    let user = provider
        .get_user_info(&access_token)
        .await
        .inspect_err(|e| warn!("Failed to get GitHub user info: {:?}", e))?;

    info!("GitHub user {} authenticated", user.login);

    let audit = record_audit(config, &user).await;

    Ok(LoginOutcome {
        access_token,
        user,
        audit,
    })
}

async fn record_audit(config: &Config, user: &UserInfo) -> AuditOutcome {
    let (Some(owner), Some(name), Some(token)) = (
        config.repo_owner(),
        config.repo_name(),
        config.repo_access_token(),
    ) else {
        info!("Audit repository not configured, skipping login audit");
        return AuditOutcome::Skipped;
    };

    let client = match github::http_client(config) {
        Ok(client) => client,
        Err(e) => {
            warn!("Failed to build client for login audit: {:?}", e);
            return AuditOutcome::Failed;
        }
    };
    let store = GitHubContentsClient::new(
        client,
        config.provider_api_base_url(),
        Repository { owner, name },
        token,
    );

    match login_audit::record_login(
        &store,
        config.audit_file_path(),
        user,
        config.audit_write_attempts,
        Utc::now(),
    )
    .await
    {
        Ok(record) => AuditOutcome::Recorded(record),
        Err(e) => {
            warn!("Failed to update login audit for {}: {:?}", user.login, e);
            AuditOutcome::Failed
        }
    }
}

/// Target origin for the callback page's `postMessage`.
///
/// The origin of the configured site URL, or `*` when there is none.
pub fn post_message_origin(config: &Config) -> String {
    config
        .site_url()
        .and_then(|site| url::Url::parse(&site).ok())
        .map(|site| site.origin())
        .filter(|origin| origin.is_tuple())
        .map(|origin| origin.ascii_serialization())
        .unwrap_or_else(|| "*".to_string())
}
