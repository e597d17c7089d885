//! Handler for short URL redirect.

use axum::{
    extract::{Path, State},
    http::{StatusCode, header},
    response::IntoResponse,
};
use tracing::debug;

use crate::error::AppError;
use crate::state::AppState;

/// Redirects a short code to its original URL.
///
/// # Endpoint
///
/// `GET /{code}`
///
/// # Request Flow
///
/// 1. Resolve the code with a single store read
/// 2. Queue a visit event for the background worker
/// 3. Return 301 Moved Permanently
///
/// The visit is counted after the response is produced. If the queue is
/// full the visit is dropped; the redirect is unaffected.
///
/// # Errors
///
/// - 404 if the code is unknown or expired
/// - 500 on storage failure
pub async fn redirect_handler(
    Path(code): Path<String>,
    State(state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let long_url = state.url_service.resolve(&code).await?;
    debug!("Redirecting {} -> {}", code, long_url);

    state.record_visit(&code);

    Ok((StatusCode::MOVED_PERMANENTLY, [(header::LOCATION, long_url)]))
}
