//! Short code value type.

use serde::Serialize;
use serde_json::json;
use std::fmt;

use crate::error::AppError;

/// Maximum accepted length for any short code, generated or custom.
pub const MAX_CODE_LENGTH: usize = 64;

/// Codes that would shadow fixed routes (`/health`, `/api/...`).
const RESERVED_CODES: &[&str] = &["api", "health"];

/// A validated short code.
///
/// Generated codes use only `[a-zA-Z0-9]`; custom codes may additionally
/// contain `-` and `_`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct ShortCode(String);

impl ShortCode {
    /// Parses a user-supplied code.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::InvalidInput`] if the code is empty, longer than
    /// [`MAX_CODE_LENGTH`], contains characters outside `[a-zA-Z0-9_-]`, or is
    /// reserved for a system route.
    pub fn parse(code: &str) -> Result<Self, AppError> {
        if code.is_empty() || code.len() > MAX_CODE_LENGTH {
            return Err(AppError::invalid_input(
                format!("Short code must be 1-{MAX_CODE_LENGTH} characters"),
                json!({ "provided_length": code.len() }),
            ));
        }

        if !code
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        {
            return Err(AppError::invalid_input(
                "Short code can only contain letters, digits, hyphens and underscores",
                json!({ "code": code }),
            ));
        }

        if RESERVED_CODES.contains(&code) {
            return Err(AppError::invalid_input(
                "This code is reserved",
                json!({ "code": code }),
            ));
        }

        Ok(Self(code.to_string()))
    }

    /// Wraps a code produced by the generator, which only emits alphabet characters.
    pub(crate) fn from_generated(code: String) -> Self {
        Self(code)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for ShortCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ShortCode {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
