//! Handler for link shortening endpoint.

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::{HeaderMap, StatusCode},
};
use tracing::info;
use validator::Validate;

use crate::api::dto::shorten::{ShortenRequest, ShortenResponse};
use crate::error::AppError;
use crate::state::AppState;
use crate::utils::url_validator::validate_url;

/// Creates a short URL.
///
/// # Endpoint
///
/// `POST /api/v1/shorten`
///
/// # Request Body
///
/// ```json
/// {
///   "long_url": "https://example.com",
///   "custom_code": "my-link",            // optional
///   "expires_at": "2030-01-01T00:00:00Z", // optional
///   "no_expiry": false                    // optional
/// }
/// ```
///
/// # Response
///
/// `201 Created`
///
/// ```json
/// {
///   "short_code": "aZ3kQ9",
///   "short_url": "http://localhost:8080/aZ3kQ9",
///   "long_url": "https://example.com",
///   "created_at": "2025-01-01T00:00:00Z",
///   "expires_at": "2026-01-01T00:00:00Z"
/// }
/// ```
///
/// # Errors
///
/// - 400 for malformed JSON, an invalid URL or custom code, or a taken custom code
/// - 500 on storage failure or keyspace exhaustion
pub async fn shorten_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<ShortenRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<ShortenResponse>), AppError> {
    let Json(payload) = payload?;
    payload.validate()?;

    let expiry = payload.expiry()?;
    let long_url = validate_url(&payload.long_url)?;

    let mapping = state
        .url_service
        .create_short_url(long_url, payload.custom_code, expiry)
        .await?;

    info!("Shortened {} -> {}", mapping.code, mapping.long_url);

    let short_url = state.short_url(&headers, mapping.code.as_str());

    Ok((
        StatusCode::CREATED,
        Json(ShortenResponse::from_mapping(mapping, short_url)),
    ))
}
