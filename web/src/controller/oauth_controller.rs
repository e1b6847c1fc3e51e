//! Controller for the GitHub OAuth handshake used by the CMS editor.
//!
//! The editor opens `/api/auth` in a popup; the provider sends the browser back to
//! `/api/callback`, which answers with a page that hands the token to the editor window.

use crate::extractors::oauth_state_cookie::{clear_state_cookie, state_cookie, OAuthStateCookie};
use crate::params::oauth::CallbackParams;
use crate::response::authorization_page;
use crate::{AppState, Error};

use axum::extract::{Query, State};
use axum::http::{header, StatusCode};
use axum::response::{Html, IntoResponse};
use domain::oauth_login::{self, AuditOutcome};
use log::*;

/// GET /api/auth
///
/// Redirects to GitHub's authorization endpoint and pins a fresh state token in an
/// HTTP-only cookie.
#[utoipa::path(
    get,
    path = "/api/auth",
    responses(
        (status = 302, description = "Redirect to GitHub OAuth, sets the oauth_state cookie"),
        (status = 500, description = "OAuth not configured", body = crate::error::ErrorBody),
    )
)]
pub async fn authorize(State(app_state): State<AppState>) -> Result<impl IntoResponse, Error> {
    let redirect = oauth_login::authorize_redirect(&app_state.config)?;

    info!("Redirecting browser to GitHub for authorization");
    Ok((
        StatusCode::FOUND,
        [
            (header::LOCATION, redirect.url),
            (header::SET_COOKIE, state_cookie(&redirect.state)),
        ],
    ))
}

/// GET /api/callback
///
/// Handles the redirect back from GitHub after the user approved the app.
#[utoipa::path(
    get,
    path = "/api/callback",
    params(CallbackParams),
    responses(
        (status = 200, description = "Page posting the token and user to the opener window", body = String, content_type = "text/html"),
        (status = 400, description = "State mismatch, missing code or code rejected by GitHub", body = crate::error::ErrorBody),
        (status = 500, description = "OAuth not configured or GitHub unreachable", body = crate::error::ErrorBody),
    )
)]
pub async fn callback(
    State(app_state): State<AppState>,
    OAuthStateCookie(cookie_state): OAuthStateCookie,
    Query(params): Query<CallbackParams>,
) -> Result<impl IntoResponse, Error> {
    let code = oauth_login::verify_callback(
        params.state.as_deref(),
        cookie_state.as_deref(),
        params.code.as_deref(),
    )?;

    let outcome = oauth_login::complete_login(&app_state.config, &code).await?;

    match &outcome.audit {
        AuditOutcome::Recorded(record) => debug!(
            "Login audit for {} now at {} logins",
            outcome.user.login, record.login_count
        ),
        AuditOutcome::Skipped | AuditOutcome::Failed => {
            debug!("Login audit not recorded for {}", outcome.user.login)
        }
    }

    let page = authorization_page::render(
        outcome.access_token.secret(),
        &outcome.user.raw,
        &oauth_login::post_message_origin(&app_state.config),
    );

    Ok(([(header::SET_COOKIE, clear_state_cookie())], Html(page)))
}
