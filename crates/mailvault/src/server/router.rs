//! Axum router construction.

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{compression::CompressionLayer, timeout::TimeoutLayer, trace::TraceLayer};

use super::{handlers, middleware, state::AppState};

/// Build the application [`Router`] with all routes and middleware attached.
pub fn build(state: AppState) -> Router {
    Router::new()
        .route("/credential/register", post(handlers::register))
        .route("/send-email", post(handlers::send_email))
        .route("/health", get(handlers::health))
        .fallback(handlers::not_found)
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::new(middleware::REQUEST_TIMEOUT))
        .layer(CompressionLayer::new())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::{sync::Arc, time::Duration};

    use axum::{body::Body, http::Request};
    use tower::ServiceExt;

    use crate::mail::MockMailTransport;
    use crate::store::MemoryStore;
    use crate::vault::Vault;

    fn test_state() -> AppState {
        AppState::new(Vault::new(
            Arc::new(MemoryStore::new()),
            Arc::new(MockMailTransport::new()),
            Duration::from_secs(5),
            "https://guide.example",
        ))
    }

    #[tokio::test]
    async fn unknown_route_returns_404() {
        let app = build(test_state());
        let req = Request::builder()
            .uri("/unknown")
            .body(Body::empty())
            .unwrap();
        let resp = app.oneshot(req).await.unwrap();
        assert_eq!(resp.status(), 404);
    }

    #[tokio::test]
    async fn health_route_exists() {
        let app = build(test_state());
        let req = Request::builder()
            .uri("/health")
            .body(Body::empty())
            .unwrap();
        let resp = app.oneshot(req).await.unwrap();
        assert_eq!(resp.status(), 200);
    }

    #[tokio::test]
    async fn register_route_rejects_get() {
        let app = build(test_state());
        let req = Request::builder()
            .uri("/credential/register")
            .body(Body::empty())
            .unwrap();
        let resp = app.oneshot(req).await.unwrap();
        assert_eq!(resp.status(), 405);
    }
}
