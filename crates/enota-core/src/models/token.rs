use std::fmt;

use serde::{Deserialize, Serialize};

/// Credentials issued by `POST /api/token/`.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenPair {
    pub access: String,
    pub refresh: String,
}

// Tokens are bearer credentials; keep them out of logs
impl fmt::Debug for TokenPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenPair")
            .field("access", &"<redacted>")
            .field("refresh", &"<redacted>")
            .finish()
    }
}

/// Body of a successful `POST /api/token/refresh/`.
///
/// The refresh token is not rotated, so only `access` is read.
#[derive(Clone, Deserialize)]
pub struct RefreshResponse {
    pub access: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct Credentials<'a> {
    pub username: &'a str,
    pub password: &'a str,
}

#[derive(Debug, Serialize)]
pub(crate) struct RefreshRequest<'a> {
    pub refresh: &'a str,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_redacts_tokens() {
        let pair = TokenPair {
            access: "secret-access".to_string(),
            refresh: "secret-refresh".to_string(),
        };
        let out = format!("{:?}", pair);
        assert!(!out.contains("secret"));
    }

    #[test]
    fn test_refresh_response_ignores_extra_fields() {
        let parsed: RefreshResponse =
            serde_json::from_str(r#"{"access":"NEW","refresh":"ignored"}"#).unwrap();
        assert_eq!(parsed.access, "NEW");
        assert!(serde_json::from_str::<RefreshResponse>(r#"{"token":"x"}"#).is_err());
    }
}
