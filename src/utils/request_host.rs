//! Host extraction from HTTP request headers.

use axum::http::{HeaderMap, header};

/// Returns the `Host` header value, port included.
///
/// Used to build `short_url` values when no public base URL is configured.
/// Values that are not plain `host[:port]` text are ignored so they cannot be
/// echoed back into responses.
///
/// # Examples
///
/// ```ignore
/// let mut headers = HeaderMap::new();
/// headers.insert(header::HOST, "example.com:8080".parse().unwrap());
///
/// assert_eq!(host_from_headers(&headers).as_deref(), Some("example.com:8080"));
/// ```
pub fn host_from_headers(headers: &HeaderMap) -> Option<String> {
    let host = headers.get(header::HOST)?.to_str().ok()?.trim();

    let well_formed = !host.is_empty()
        && host
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | ':' | '[' | ']'));

    well_formed.then(|| host.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers_with_host(host: &'static str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::HOST, HeaderValue::from_static(host));
        headers
    }

    #[test]
    fn test_host_simple() {
        assert_eq!(
            host_from_headers(&headers_with_host("example.com")).as_deref(),
            Some("example.com")
        );
    }

    #[test]
    fn test_host_keeps_port() {
        assert_eq!(
            host_from_headers(&headers_with_host("localhost:8080")).as_deref(),
            Some("localhost:8080")
        );
    }

    #[test]
    fn test_host_ipv6() {
        assert_eq!(
            host_from_headers(&headers_with_host("[::1]:8080")).as_deref(),
            Some("[::1]:8080")
        );
    }

    #[test]
    fn test_host_missing() {
        assert!(host_from_headers(&HeaderMap::new()).is_none());
    }

    #[test]
    fn test_host_with_path_rejected() {
        assert!(host_from_headers(&headers_with_host("evil.com/phish")).is_none());
    }
}
