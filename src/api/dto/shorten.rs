//! DTOs for link shortening endpoint.

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::LazyLock;
use validator::Validate;

use crate::domain::entities::{Expiry, Mapping};
use crate::error::AppError;

/// Compiled regex for custom code validation.
static CUSTOM_CODE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_-]+$").expect("custom code regex is valid"));

/// Request to shorten a single URL.
#[derive(Debug, Deserialize, Validate)]
pub struct ShortenRequest {
    /// The original URL; a missing scheme is completed to `https://`.
    ///
    /// Bounds mirror `MAX_URL_LENGTH`; validator takes `u64` literals here.
    #[validate(length(min = 1, max = 2048))]
    pub long_url: String,

    /// Optional custom short code. Bounds mirror `MAX_CODE_LENGTH`.
    #[validate(length(min = 1, max = 64))]
    #[validate(regex(
        path = *CUSTOM_CODE_REGEX,
        message = "custom_code may only contain letters, digits, '-' and '_'"
    ))]
    pub custom_code: Option<String>,

    /// Optional expiry timestamp (RFC 3339). Defaults to the configured TTL.
    pub expires_at: Option<DateTime<Utc>>,

    /// Requests a link without expiry, if the server allows it.
    #[serde(default)]
    pub no_expiry: bool,
}

impl ShortenRequest {
    /// Resolves the requested lifetime.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::InvalidInput`] if both `expires_at` and `no_expiry` are set.
    pub fn expiry(&self) -> Result<Expiry, AppError> {
        match (self.expires_at, self.no_expiry) {
            (Some(_), true) => Err(AppError::invalid_input(
                "expires_at and no_expiry are mutually exclusive",
                json!({ "fields": ["expires_at", "no_expiry"] }),
            )),
            (Some(at), false) => Ok(Expiry::At(at)),
            (None, true) => Ok(Expiry::Never),
            (None, false) => Ok(Expiry::Default),
        }
    }
}

/// Response for a created short link.
#[derive(Debug, Serialize, Deserialize)]
pub struct ShortenResponse {
    pub short_code: String,
    pub short_url: String,
    pub long_url: String,
    pub created_at: Option<DateTime<Utc>>,
    pub expires_at: Option<DateTime<Utc>>,
}

impl ShortenResponse {
    pub fn from_mapping(mapping: Mapping, short_url: String) -> Self {
        Self {
            short_code: mapping.code.into_inner(),
            short_url,
            long_url: mapping.long_url,
            created_at: mapping.created_at,
            expires_at: mapping.expires_at,
        }
    }
}
