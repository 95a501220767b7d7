//! Shared-secret check for the `X-API-Key` header.

use axum::http::{HeaderMap, HeaderName};
use secrecy::{ExposeSecret, Secret};
use tracing::warn;

/// Header carrying the caller's API key.
pub const API_KEY_HEADER: HeaderName = HeaderName::from_static("x-api-key");

/// Check the request's API key against the configured one.
///
/// A missing or non-UTF-8 header never matches.
pub fn verify_api_key(headers: &HeaderMap, expected: &Secret<String>) -> bool {
    let provided = match headers.get(API_KEY_HEADER).map(|v| v.to_str()) {
        Some(Ok(value)) => value,
        Some(Err(_)) => {
            warn!("api_key_not_utf8");
            return false;
        }
        None => {
            warn!("api_key_missing");
            return false;
        }
    };

    let valid = constant_time_compare(provided, expected.expose_secret());
    if !valid {
        warn!(provided_length = provided.len(), "api_key_mismatch");
    }
    valid
}

/// Constant-time string comparison to prevent timing attacks.
fn constant_time_compare(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }

    let mut result = 0u8;
    for (x, y) in a.bytes().zip(b.bytes()) {
        result |= x ^ y;
    }
    result == 0
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn secret(s: &str) -> Secret<String> {
        Secret::new(s.to_string())
    }

    #[test]
    fn test_matching_key() {
        let mut headers = HeaderMap::new();
        headers.insert(API_KEY_HEADER, HeaderValue::from_static("secret123"));

        assert!(verify_api_key(&headers, &secret("secret123")));
    }

    #[test]
    fn test_header_name_case_insensitive() {
        let mut headers = HeaderMap::new();
        let name = HeaderName::from_bytes(b"X-Api-Key").unwrap();
        headers.insert(name, HeaderValue::from_static("secret123"));

        assert!(verify_api_key(&headers, &secret("secret123")));
    }

    #[test]
    fn test_missing_key() {
        assert!(!verify_api_key(&HeaderMap::new(), &secret("secret123")));
    }

    #[test]
    fn test_wrong_key() {
        let mut headers = HeaderMap::new();
        headers.insert(API_KEY_HEADER, HeaderValue::from_static("secret124"));
        assert!(!verify_api_key(&headers, &secret("secret123")));

        headers.insert(API_KEY_HEADER, HeaderValue::from_static(""));
        assert!(!verify_api_key(&headers, &secret("secret123")));
    }

    #[test]
    fn test_non_utf8_key() {
        let mut headers = HeaderMap::new();
        headers.insert(API_KEY_HEADER, HeaderValue::from_bytes(b"\xffsecret").unwrap());

        assert!(!verify_api_key(&headers, &secret("secret123")));
    }

    #[test]
    fn test_constant_time_compare() {
        assert!(constant_time_compare("abc", "abc"));
        assert!(!constant_time_compare("abc", "abd"));
        assert!(!constant_time_compare("abc", "abcd"));
    }
}
