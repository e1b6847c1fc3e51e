use axum::http::StatusCode;
use axum::response::IntoResponse;

/// GET report that the server is up
#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "API router is up and responding to requests", body = String),
    )
)]
pub async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, "healthy")
}

#[cfg(test)]
mod tests {
    use crate::router::define_routes;
    use crate::AppState;
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use service::config::Config;
    use tower::ServiceExt;

    #[tokio::test]
    async fn test_health_check_returns_healthy() {
        let config = Config::from_args(["devnotes_oauth"]).unwrap();
        let app = define_routes(AppState::new(config));

        let request = Request::builder()
            .uri("/health")
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&body[..], b"healthy");
    }
}
