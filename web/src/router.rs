use crate::controller::{health_check_controller, oauth_controller};
use crate::AppState;
use axum::{routing::get, Router};

use utoipa::OpenApi;
use utoipa_rapidoc::RapiDoc;

// Global OpenAPI document. To be a part
// of the rendered document, a path and schema must be listed here.
#[derive(OpenApi)]
#[openapi(
        info(
            title = "DevNotes OAuth API"
        ),
        paths(
            oauth_controller::authorize,
            oauth_controller::callback,
            health_check_controller::health_check,
        ),
        components(
            schemas(
                crate::error::ErrorBody,
            )
        ),
        tags(
            (name = "devnotes_oauth", description = "GitHub OAuth handshake for the DevNotes CMS")
        )
    )]
struct ApiDoc;

pub fn define_routes(app_state: AppState) -> Router {
    Router::new()
        .merge(health_routes())
        .merge(oauth_routes(app_state))
        .merge(RapiDoc::with_openapi("/api-docs/openapi.json", ApiDoc::openapi()).path("/rapidoc"))
}

fn health_routes() -> Router {
    Router::new().route("/health", get(health_check_controller::health_check))
}

fn oauth_routes(app_state: AppState) -> Router {
    Router::new()
        .route("/api/auth", get(oauth_controller::authorize))
        // Callback is reached through the provider's redirect, not from the editor.
        .route("/api/callback", get(oauth_controller::callback))
        .with_state(app_state)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_lists_every_route() {
        let doc = ApiDoc::openapi();
        for path in ["/api/auth", "/api/callback", "/health"] {
            assert!(doc.paths.paths.contains_key(path), "{path} not documented");
        }
    }
}
