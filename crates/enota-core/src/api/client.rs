//! Authenticated request client for the notes REST API.
//!
//! `AuthClient::send` attaches the stored access token as a bearer
//! credential. When the server answers `401`, it exchanges the refresh token
//! for a new access token once and replays the request once.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use reqwest::header::{self, HeaderValue};
use reqwest::{Client, Response, StatusCode, Url};
use tracing::{debug, info, warn};

use crate::auth::{TokenKey, TokenStore};
use crate::models::token::RefreshRequest;
use crate::models::RefreshResponse;

use super::{ApiError, ApiRequest};

// ============================================================================
// Constants
// ============================================================================

/// Path of the endpoint that exchanges a refresh token for an access token
pub const REFRESH_PATH: &str = "/api/token/refresh/";

/// HTTP request timeout in seconds.
pub const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Why a request ended without a usable session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnauthenticatedReason {
    /// The server rejected the access token and no refresh token was stored
    NoRefreshToken,
    /// The refresh endpoint answered with a non-2xx status
    RefreshRejected(StatusCode),
    /// The refresh endpoint answered 2xx without a usable `access` field
    MalformedRefreshResponse,
}

impl fmt::Display for UnauthenticatedReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoRefreshToken => f.write_str("no refresh token stored"),
            Self::RefreshRejected(status) => write!(f, "refresh rejected with status {}", status),
            Self::MalformedRefreshResponse => f.write_str("malformed refresh response"),
        }
    }
}

/// Result of `AuthClient::send` when no transport error occurred.
#[derive(Debug)]
pub enum SendOutcome {
    /// The server produced a final response. Its status may be anything
    /// other than a first-attempt `401`; a replayed request is returned
    /// whatever its status.
    Success(Response),
    /// The session cannot be recovered; the user has to log in again.
    Unauthenticated(UnauthenticatedReason),
}

impl SendOutcome {
    pub fn is_unauthenticated(&self) -> bool {
        matches!(self, SendOutcome::Unauthenticated(_))
    }

    /// The response, or `ApiError::Unauthorized` when the session is gone
    pub fn into_response(self) -> Result<Response, ApiError> {
        match self {
            SendOutcome::Success(response) => Ok(response),
            SendOutcome::Unauthenticated(_) => Err(ApiError::Unauthorized),
        }
    }
}

enum RefreshResult {
    Refreshed(String),
    Rejected(UnauthenticatedReason),
}

/// HTTP client that manages bearer credentials through a `TokenStore`.
///
/// Clone is cheap: `reqwest::Client` and the store are both reference counted.
/// Concurrent `send` calls are not coordinated; two calls that both see a
/// `401` each perform their own refresh.
#[derive(Clone)]
pub struct AuthClient {
    client: Client,
    base_url: Arc<str>,
    store: Arc<dyn TokenStore>,
}

impl AuthClient {
    /// Create a client with the default request timeout
    pub fn new(base_url: &str, store: Arc<dyn TokenStore>) -> Result<Self, ApiError> {
        Self::with_timeout(base_url, store, Duration::from_secs(REQUEST_TIMEOUT_SECS))
    }

    pub fn with_timeout(
        base_url: &str,
        store: Arc<dyn TokenStore>,
        timeout: Duration,
    ) -> Result<Self, ApiError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self::with_client(client, base_url, store))
    }

    /// Create a client around an existing `reqwest::Client`, sharing its connection pool
    pub fn with_client(client: Client, base_url: &str, store: Arc<dyn TokenStore>) -> Self {
        Self {
            client,
            base_url: Arc::from(base_url.trim_end_matches('/')),
            store,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn store(&self) -> &Arc<dyn TokenStore> {
        &self.store
    }

    /// Underlying HTTP client, for endpoints that take no bearer credential
    pub(crate) fn http(&self) -> &Client {
        &self.client
    }

    /// Absolute URLs pass through unchanged; anything else is joined to the base URL.
    pub fn resolve_url(&self, url: &str) -> String {
        match Url::parse(url) {
            Ok(parsed) if !parsed.cannot_be_a_base() => url.to_string(),
            _ => format!("{}/{}", self.base_url, url.trim_start_matches('/')),
        }
    }

    /// Issue `request` with the stored access token.
    ///
    /// On a `401`, exchanges the refresh token once and replays the request
    /// once with the new access token. A rejected or malformed refresh
    /// clears both stored tokens. Transport failures from any of the three
    /// requests are returned as `ApiError::NetworkError` and never retried.
    pub async fn send(&self, request: &ApiRequest) -> Result<SendOutcome, ApiError> {
        let url = self.resolve_url(request.url());
        let access_token = self.store.get(TokenKey::Access)?;

        let response = self.dispatch(&url, request, access_token.as_deref()).await?;
        if response.status() != StatusCode::UNAUTHORIZED {
            return Ok(SendOutcome::Success(response));
        }

        debug!(method = %request.method(), url = %url, "Access token rejected");

        let Some(refresh_token) = self.store.get(TokenKey::Refresh)? else {
            warn!("Access token rejected and no refresh token stored");
            return Ok(SendOutcome::Unauthenticated(UnauthenticatedReason::NoRefreshToken));
        };

        let new_access = match self.refresh_access_token(&refresh_token).await? {
            RefreshResult::Refreshed(token) => token,
            RefreshResult::Rejected(reason) => {
                warn!(%reason, "Token refresh failed, clearing stored credentials");
                self.store.clear()?;
                return Ok(SendOutcome::Unauthenticated(reason));
            }
        };

        self.store.set(TokenKey::Access, &new_access)?;
        info!("Access token refreshed");

        let retry = self.dispatch(&url, request, Some(&new_access)).await?;
        debug!(status = %retry.status(), url = %url, "Replayed request after refresh");
        Ok(SendOutcome::Success(retry))
    }

    async fn dispatch(
        &self,
        url: &str,
        request: &ApiRequest,
        access_token: Option<&str>,
    ) -> Result<Response, ApiError> {
        let mut headers = request.headers().clone();
        let mut bearer = HeaderValue::from_str(&format!("Bearer {}", access_token.unwrap_or_default()))
            .map_err(|_| ApiError::InvalidRequest("access token is not a valid header value".to_string()))?;
        bearer.set_sensitive(true);
        headers.insert(header::AUTHORIZATION, bearer);

        let mut builder = self
            .client
            .request(request.method().clone(), url)
            .headers(headers);
        if let Some(body) = request.body_bytes() {
            builder = builder.body(body.to_vec());
        }

        debug!(method = %request.method(), url = %url, "Sending request");
        Ok(builder.send().await?)
    }

    async fn refresh_access_token(&self, refresh_token: &str) -> Result<RefreshResult, ApiError> {
        let url = self.resolve_url(REFRESH_PATH);
        let response = self
            .client
            .post(&url)
            .json(&RefreshRequest { refresh: refresh_token })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Ok(RefreshResult::Rejected(UnauthenticatedReason::RefreshRejected(status)));
        }

        let body = response.text().await?;
        match serde_json::from_str::<RefreshResponse>(&body) {
            Ok(parsed) => Ok(RefreshResult::Refreshed(parsed.access)),
            Err(e) => {
                debug!(error = %e, "Could not decode refresh response");
                Ok(RefreshResult::Rejected(UnauthenticatedReason::MalformedRefreshResponse))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::MemoryTokenStore;

    fn client(base: &str) -> AuthClient {
        AuthClient::new(base, Arc::new(MemoryTokenStore::new())).unwrap()
    }

    #[test]
    fn test_resolve_relative_url() {
        let c = client("http://127.0.0.1:8000");
        assert_eq!(c.resolve_url("/api/notes/"), "http://127.0.0.1:8000/api/notes/");
        assert_eq!(c.resolve_url("api/notes/"), "http://127.0.0.1:8000/api/notes/");
    }

    #[test]
    fn test_resolve_trailing_slash_base() {
        let c = client("https://notes.example.com/");
        assert_eq!(c.base_url(), "https://notes.example.com");
        assert_eq!(c.resolve_url("/api/token/refresh/"), "https://notes.example.com/api/token/refresh/");
    }

    #[test]
    fn test_resolve_absolute_url_unchanged() {
        let c = client("http://127.0.0.1:8000");
        assert_eq!(
            c.resolve_url("https://other.example.com/api/notes/?page=2"),
            "https://other.example.com/api/notes/?page=2"
        );
        // host:port without a scheme is not absolute
        assert_eq!(c.resolve_url("localhost:9000/x"), "http://127.0.0.1:8000/localhost:9000/x");
    }

    #[test]
    fn test_outcome_into_response() {
        let outcome = SendOutcome::Unauthenticated(UnauthenticatedReason::NoRefreshToken);
        assert!(outcome.is_unauthenticated());
        assert!(matches!(outcome.into_response(), Err(ApiError::Unauthorized)));
    }

    #[test]
    fn test_reason_display() {
        assert_eq!(
            UnauthenticatedReason::RefreshRejected(StatusCode::UNAUTHORIZED).to_string(),
            "refresh rejected with status 401 Unauthorized"
        );
    }
}
