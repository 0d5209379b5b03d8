//! `Authorization` header extraction for the two credential schemes.
//!
//! Both extractors remove the first occurrence of their scheme prefix,
//! wherever it appears in the value. A header without the prefix is returned
//! unchanged, so a bare token is accepted as if it carried the scheme. That
//! leniency is relied on by existing clients.

use http::HeaderMap;
use http::header::AUTHORIZATION;

use super::AuthError;

/// Scheme prefix for user-session credentials.
pub const BEARER_PREFIX: &str = "Bearer ";

/// Scheme prefix for the static service key.
pub const API_KEY_PREFIX: &str = "ApiKey ";

/// Extract the token from `Authorization: Bearer <token>`.
pub fn bearer_token(headers: &HeaderMap) -> Result<String, AuthError> {
    extract(headers, BEARER_PREFIX, "no token provided")
}

/// Extract the key from `Authorization: ApiKey <key>`.
pub fn api_key(headers: &HeaderMap) -> Result<String, AuthError> {
    extract(headers, API_KEY_PREFIX, "no api key provided")
}

fn extract(headers: &HeaderMap, prefix: &str, missing: &str) -> Result<String, AuthError> {
    // A value that is not visible ASCII is treated like an absent header.
    let value = headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();

    let credential = value.replacen(prefix, "", 1);
    if credential.is_empty() {
        return Err(AuthError::MissingCredential(missing.to_string()));
    }
    Ok(credential)
}

#[cfg(test)]
mod tests {
    use http::HeaderValue;

    use super::*;

    fn headers(value: Option<&'static str>) -> HeaderMap {
        let mut headers = HeaderMap::new();
        if let Some(v) = value {
            headers.insert(AUTHORIZATION, HeaderValue::from_static(v));
        }
        headers
    }

    #[test]
    fn bearer_prefix_is_stripped() {
        assert_eq!(bearer_token(&headers(Some("Bearer abc123"))).unwrap(), "abc123");
    }

    #[test]
    fn bare_token_is_accepted() {
        assert_eq!(bearer_token(&headers(Some("abc123"))).unwrap(), "abc123");
    }

    #[test]
    fn missing_header_fails() {
        let err = bearer_token(&headers(None)).unwrap_err();
        assert!(matches!(err, AuthError::MissingCredential(ref m) if m == "no token provided"));
    }

    #[test]
    fn empty_remainder_fails() {
        assert!(matches!(
            bearer_token(&headers(Some("Bearer "))).unwrap_err(),
            AuthError::MissingCredential(_)
        ));
    }

    #[test]
    fn only_first_prefix_is_stripped() {
        assert_eq!(
            bearer_token(&headers(Some("Bearer Bearer abc"))).unwrap(),
            "Bearer abc"
        );
    }

    #[test]
    fn prefix_is_removed_where_it_first_appears() {
        assert_eq!(
            bearer_token(&headers(Some("Token Bearer abc"))).unwrap(),
            "Token abc"
        );
        assert_eq!(
            api_key(&headers(Some("Key ApiKey f271c81f"))).unwrap(),
            "Key f271c81f"
        );
    }

    #[test]
    fn prefix_match_is_case_sensitive() {
        assert_eq!(
            bearer_token(&headers(Some("bearer abc123"))).unwrap(),
            "bearer abc123"
        );
    }

    #[test]
    fn api_key_prefix_is_stripped() {
        assert_eq!(api_key(&headers(Some("ApiKey f271c81ff7084ee5"))).unwrap(), "f271c81ff7084ee5");
        assert_eq!(api_key(&headers(Some("f271c81ff7084ee5"))).unwrap(), "f271c81ff7084ee5");
    }

    #[test]
    fn api_key_missing_or_empty_fails() {
        for value in [None, Some("ApiKey ")] {
            let err = api_key(&headers(value)).unwrap_err();
            assert!(matches!(err, AuthError::MissingCredential(ref m) if m == "no api key provided"));
        }
    }

    #[test]
    fn api_key_scheme_does_not_strip_bearer() {
        assert_eq!(api_key(&headers(Some("Bearer abc"))).unwrap(), "Bearer abc");
    }
}
