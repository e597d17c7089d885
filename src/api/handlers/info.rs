//! Handler for link info endpoint.

use axum::{
    Json,
    extract::{Path, State},
    http::HeaderMap,
};

use crate::api::dto::info::InfoResponse;
use crate::error::AppError;
use crate::state::AppState;

/// Returns a mapping and its visit count.
///
/// # Endpoint
///
/// `GET /api/v1/info/{code}`
///
/// # Response
///
/// ```json
/// {
///   "short_code": "aZ3kQ9",
///   "short_url": "http://localhost:8080/aZ3kQ9",
///   "long_url": "https://example.com",
///   "visits": 42,
///   "created_at": "2025-01-01T00:00:00Z",
///   "expires_at": "2026-01-01T00:00:00Z"
/// }
/// ```
///
/// The visit count is eventually consistent: redirects are counted by a
/// background worker and may not be reflected immediately.
///
/// # Errors
///
/// - 404 if the code is unknown or expired
/// - 500 on storage failure
pub async fn info_handler(
    Path(code): Path<String>,
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<InfoResponse>, AppError> {
    let info = state.url_service.get_url(&code).await?;
    let short_url = state.short_url(&headers, info.mapping.code.as_str());

    Ok(Json(InfoResponse::from_info(info, short_url)))
}
