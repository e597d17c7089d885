//! Syntactic pre-check for URLs submitted for shortening.
//!
//! Runs in the HTTP layer before the URL reaches the service. Unlike a
//! normalizer it does not rewrite the URL beyond adding a missing scheme, so
//! the stored value is exactly what the client sent.

use url::Url;

/// Longest URL accepted for shortening.
pub const MAX_URL_LENGTH: usize = 2048;

/// Errors that can occur during URL validation.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum UrlValidationError {
    #[error("URL must not be empty")]
    Empty,

    #[error("URL exceeds {MAX_URL_LENGTH} characters")]
    TooLong,

    #[error("Invalid URL format")]
    InvalidFormat,

    #[error("Only HTTP and HTTPS protocols are allowed")]
    UnsupportedProtocol,

    #[error("Invalid URL: no host found")]
    MissingHost,

    #[error("Invalid domain name")]
    InvalidDomain,
}

/// Validates a URL and prefixes `https://` when no scheme is given.
///
/// # Rules
///
/// 1. Surrounding whitespace is trimmed
/// 2. Input without `http://` or `https://` gets `https://` prepended
/// 3. The result must parse as an absolute URL with an `http`/`https` scheme
/// 4. The host must contain at least one `.` (IP literals excepted)
///
/// # Errors
///
/// Returns a [`UrlValidationError`] describing the first rule violated.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(validate_url("example.com/a").unwrap(), "https://example.com/a");
/// assert_eq!(validate_url("http://example.com").unwrap(), "http://example.com");
/// assert!(validate_url("javascript:alert(1)").is_err());
/// ```
pub fn validate_url(input: &str) -> Result<String, UrlValidationError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(UrlValidationError::Empty);
    }
    if trimmed.len() > MAX_URL_LENGTH {
        return Err(UrlValidationError::TooLong);
    }

    let lower = trimmed.to_ascii_lowercase();
    let candidate = if lower.starts_with("http://") || lower.starts_with("https://") {
        trimmed.to_string()
    } else if has_explicit_scheme(trimmed) {
        return Err(UrlValidationError::UnsupportedProtocol);
    } else {
        format!("https://{trimmed}")
    };

    let parsed = Url::parse(&candidate).map_err(|_| UrlValidationError::InvalidFormat)?;

    match parsed.scheme() {
        "http" | "https" => {}
        _ => return Err(UrlValidationError::UnsupportedProtocol),
    }

    let host = parsed.host().ok_or(UrlValidationError::MissingHost)?;
    if let url::Host::Domain(domain) = host
        && !domain.contains('.')
    {
        return Err(UrlValidationError::InvalidDomain);
    }

    Ok(candidate)
}

/// Detects `scheme:` prefixes such as `javascript:` or `ftp:`, but not `host:port`.
fn has_explicit_scheme(input: &str) -> bool {
    let Some((scheme, rest)) = input.split_once(':') else {
        return false;
    };

    let looks_like_scheme = scheme
        .chars()
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic())
        && scheme
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'));
    let is_port = rest
        .chars()
        .next()
        .is_some_and(|c| c.is_ascii_digit());

    looks_like_scheme && !is_port && !scheme.contains('.')
}
