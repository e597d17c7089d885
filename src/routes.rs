//! Top-level router configuration.
//!
//! # Route Structure
//!
//! - `GET  /{code}`                - Short link redirect (301)
//! - `GET  /health`                - Store reachability
//! - `POST /api/v1/shorten`        - Create a short URL
//! - `GET  /api/v1/info/{code}`    - Mapping details and visit count
//!
//! # Middleware
//!
//! - **Tracing** - Structured request/response logging
//! - **Path normalization** - Trailing slash handling

use crate::api;
use crate::api::handlers::{health_handler, redirect_handler};
use crate::api::middleware::tracing;
use crate::state::AppState;
use axum::Router;
use axum::routing::get;
use tower::Layer;
use tower_http::normalize_path::{NormalizePath, NormalizePathLayer};

/// Builds the route table with state and tracing applied.
///
/// `/health` and `/api` are registered as static routes, so they take
/// precedence over the `/{code}` capture; the same names are reserved for
/// custom codes.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/{code}", get(redirect_handler))
        .route("/health", get(health_handler))
        .nest("/api/v1", api::routes::api_routes())
        .with_state(state)
        .layer(tracing::layer())
}

/// Constructs the application router with all routes and middleware.
pub fn app_router(state: AppState) -> NormalizePath<Router> {
    NormalizePathLayer::trim_trailing_slash().layer(router(state))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::services::{ServiceSettings, UrlService};
    use crate::infrastructure::store::MemoryStore;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use std::sync::Arc;
    use tokio::sync::mpsc;
    use tower::ServiceExt;

    fn test_state() -> AppState {
        let service = Arc::new(UrlService::new(
            Arc::new(MemoryStore::new()),
            ServiceSettings::default(),
        ));
        let (tx, _rx) = mpsc::channel(10);
        AppState::new(service, tx, None)
    }

    #[tokio::test]
    async fn test_trailing_slash_is_trimmed() {
        let response = app_router(test_state())
            .oneshot(Request::get("/health/").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_reserved_path_is_not_a_code() {
        let response = app_router(test_state())
            .oneshot(Request::get("/api").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
