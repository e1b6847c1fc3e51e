//! HTTP surface of the DevNotes OAuth service.
//!
//! Serves `/api/auth` and `/api/callback` for the CMS editor's GitHub login popup, plus
//! `/health` and the RapiDoc API documentation.

use axum::http::{HeaderValue, Method};
use log::*;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;

pub use error::Error;
pub use service::AppState;

mod controller;
mod error;
mod extractors;
mod params;
mod response;
pub mod router;

pub async fn init_server(app_state: AppState) -> std::io::Result<()> {
    let interface = app_state
        .config
        .interface
        .clone()
        .unwrap_or_else(|| "127.0.0.1".to_string());
    let listen_addr = format!("{}:{}", interface, app_state.config.port);

    let cors_layer = cors_layer(&app_state.config.allowed_origins);
    let app = router::define_routes(app_state).layer(cors_layer);

    let listener = TcpListener::bind(&listen_addr).await?;
    info!("Server starting... listening for connections on http://{listen_addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
}

fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| {
            origin
                .parse::<HeaderValue>()
                .inspect_err(|_| warn!("Ignoring invalid CORS origin: {origin}"))
                .ok()
        })
        .collect();
    debug!("CORS allowed origins: {:?}", origins);

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET])
        .allow_credentials(true)
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Shutdown signal received, draining connections"),
        Err(e) => error!("Failed to listen for the shutdown signal: {e}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};
    use service::config::Config;
    use tower::ServiceExt;

    fn app() -> axum::Router {
        let config = Config::from_args(["devnotes_oauth"]).unwrap();
        let origins = config.allowed_origins.clone();
        app_with_origins(config, &origins)
    }

    fn app_with_origins(config: Config, origins: &[String]) -> axum::Router {
        router::define_routes(AppState::new(config)).layer(cors_layer(origins))
    }

    fn health_request(origin: &str) -> Request<Body> {
        Request::builder()
            .uri("/health")
            .header(header::ORIGIN, origin)
            .body(Body::empty())
            .unwrap()
    }

    #[tokio::test]
    async fn test_cors_allows_configured_origin() {
        let response = app()
            .oneshot(health_request("http://localhost:3000"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN],
            "http://localhost:3000"
        );
    }

    #[tokio::test]
    async fn test_cors_ignores_unknown_origin() {
        let response = app()
            .oneshot(health_request("https://evil.example.com"))
            .await
            .unwrap();

        assert!(response
            .headers()
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .is_none());
    }

    #[tokio::test]
    async fn test_invalid_origins_are_skipped() {
        let config = Config::from_args(["devnotes_oauth"]).unwrap();
        let app = app_with_origins(
            config,
            &["bad\norigin".to_string(), "http://ok.example.com".to_string()],
        );

        let response = app
            .oneshot(health_request("http://ok.example.com"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN],
            "http://ok.example.com"
        );
    }
}
