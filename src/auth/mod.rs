//! Request authentication headers.
//!
//! The API accepts a bearer token (API guard) and, for session-based
//! deployments, a CSRF token. Both are attached to every request.

use reqwest::header::{HeaderMap, HeaderName, HeaderValue, ACCEPT, AUTHORIZATION};

use crate::errors::{ClientError, Result};

/// Header name for the CSRF token.
pub const CSRF_TOKEN_HEADER: &str = "x-csrf-token";

/// Header Laravel uses to recognise XHR requests (JSON errors instead of redirects).
pub const REQUESTED_WITH_HEADER: &str = "x-requested-with";

/// Build the headers sent with every API request.
pub fn default_headers(api_token: Option<&str>, csrf_token: Option<&str>) -> Result<HeaderMap> {
    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
    headers.insert(
        HeaderName::from_static(REQUESTED_WITH_HEADER),
        HeaderValue::from_static("XMLHttpRequest"),
    );

    if let Some(token) = api_token {
        let value = HeaderValue::from_str(&format!("Bearer {}", token))
            .map_err(|_| ClientError::config("Invalid API token format"))?;
        headers.insert(AUTHORIZATION, value);
    }

    if let Some(token) = csrf_token {
        let value = HeaderValue::from_str(token)
            .map_err(|_| ClientError::config("Invalid CSRF token format"))?;
        headers.insert(HeaderName::from_static(CSRF_TOKEN_HEADER), value);
    }

    Ok(headers)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_headers() {
        let headers = default_headers(Some("abc"), Some("csrf")).unwrap();
        assert_eq!(headers[AUTHORIZATION], "Bearer abc");
        assert_eq!(headers[CSRF_TOKEN_HEADER], "csrf");
        assert_eq!(headers[REQUESTED_WITH_HEADER], "XMLHttpRequest");
        assert_eq!(headers[ACCEPT], "application/json");
    }

    #[test]
    fn test_anonymous_headers() {
        let headers = default_headers(None, None).unwrap();
        assert!(headers.get(AUTHORIZATION).is_none());
        assert!(headers.get(CSRF_TOKEN_HEADER).is_none());
    }

    #[test]
    fn test_invalid_token_rejected() {
        assert!(default_headers(Some("bad\ntoken"), None).is_err());
    }
}
