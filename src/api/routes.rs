//! API route configuration.

use crate::api::handlers::{info_handler, shorten_handler};
use crate::state::AppState;
use axum::{
    Router,
    routing::{get, post},
};

/// Versioned API routes, nested under `/api/v1`.
///
/// # Endpoints
///
/// - `POST /shorten`      - Create a short URL
/// - `GET  /info/{code}`  - Mapping details and visit count
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/shorten", post(shorten_handler))
        .route("/info/{code}", get(info_handler))
}
