//! Note, account and profile endpoints.
//!
//! Login and signup go out without a bearer credential; everything else
//! goes through `AuthClient::send` and so gets refresh-on-401.

use reqwest::Response;
use serde::de::DeserializeOwned;
use tracing::{debug, info};

use crate::models::token::Credentials;
use crate::models::{Note, NoteDraft, Profile, TokenPair};

use super::{ApiError, ApiRequest, AuthClient};

const LOGIN_PATH: &str = "/api/token/";
const REGISTER_PATH: &str = "/api/notes/register/";
const NOTES_PATH: &str = "/api/notes/";
const PROFILE_PATH: &str = "/api/notes/profile/";

const DEFAULT_LOGIN_ERROR: &str = "Invalid username or password";
const DEFAULT_SIGNUP_ERROR: &str = "Signup failed";

/// Client for the notes service.
/// Clone is cheap - it shares the underlying `AuthClient`.
#[derive(Clone)]
pub struct NotesApi {
    client: AuthClient,
}

impl NotesApi {
    pub fn new(client: AuthClient) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &AuthClient {
        &self.client
    }

    // ===== Account =====

    /// Exchange username and password for a token pair and store both tokens
    pub async fn login(&self, username: &str, password: &str) -> Result<(), ApiError> {
        let response = self
            .client
            .http()
            .post(self.client.resolve_url(LOGIN_PATH))
            .json(&Credentials { username, password })
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            debug!(%status, "Login rejected");
            let message = ApiError::error_message(&body)
                .unwrap_or_else(|| DEFAULT_LOGIN_ERROR.to_string());
            return Err(ApiError::LoginFailed(message));
        }

        let pair: TokenPair = serde_json::from_str(&body)
            .map_err(|e| ApiError::InvalidResponse(format!("token response: {}", e)))?;
        self.client.store().store_pair(&pair)?;
        info!(username, "Logged in");
        Ok(())
    }

    /// Create an account. Does not log in.
    pub async fn register(&self, username: &str, password: &str) -> Result<(), ApiError> {
        let response = self
            .client
            .http()
            .post(self.client.resolve_url(REGISTER_PATH))
            .json(&Credentials { username, password })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            debug!(%status, "Signup rejected");
            let message = ApiError::error_message(&body)
                .unwrap_or_else(|| DEFAULT_SIGNUP_ERROR.to_string());
            return Err(ApiError::SignupFailed(message));
        }

        info!(username, "Account created");
        Ok(())
    }

    /// Forget both stored tokens. Makes no request.
    pub fn logout(&self) -> Result<(), ApiError> {
        self.client.store().clear()?;
        info!("Logged out");
        Ok(())
    }

    /// True when an access token is stored. The token may still be expired.
    pub fn is_logged_in(&self) -> Result<bool, ApiError> {
        Ok(self.client.store().has_access_token()?)
    }

    // ===== Notes =====

    pub async fn list_notes(&self) -> Result<Vec<Note>, ApiError> {
        self.fetch_json(ApiRequest::get(NOTES_PATH)).await
    }

    /// Look up one note by id
    pub async fn get_note(&self, id: i64) -> Result<Note, ApiError> {
        self.list_notes()
            .await?
            .into_iter()
            .find(|note| note.id == id)
            .ok_or_else(|| ApiError::NotFound(format!("note {}", id)))
    }

    pub async fn create_note(&self, draft: &NoteDraft) -> Result<Note, ApiError> {
        draft.validate().map_err(ApiError::InvalidRequest)?;
        self.fetch_json(ApiRequest::post(NOTES_PATH).json(draft)?).await
    }

    pub async fn update_note(&self, id: i64, draft: &NoteDraft) -> Result<Note, ApiError> {
        draft.validate().map_err(ApiError::InvalidRequest)?;
        let url = format!("{}update/{}/", NOTES_PATH, id);
        self.fetch_json(ApiRequest::put(url).json(draft)?).await
    }

    pub async fn delete_note(&self, id: i64) -> Result<(), ApiError> {
        let url = format!("{}{}/", NOTES_PATH, id);
        self.execute(ApiRequest::delete(url)).await?;
        Ok(())
    }

    // ===== Profile =====

    pub async fn profile(&self) -> Result<Profile, ApiError> {
        self.fetch_json(ApiRequest::get(PROFILE_PATH)).await
    }

    // ===== Helpers =====

    /// Send through the authenticated client and require a 2xx response
    async fn execute(&self, request: ApiRequest) -> Result<Response, ApiError> {
        let response = self.client.send(&request).await?.into_response()?;
        let status = response.status();
        if status.is_success() {
            Ok(response)
        } else {
            let body = response.text().await.unwrap_or_default();
            Err(ApiError::from_status(status, &body))
        }
    }

    async fn fetch_json<T: DeserializeOwned>(&self, request: ApiRequest) -> Result<T, ApiError> {
        let url = request.url().to_string();
        let text = self.execute(request).await?.text().await?;
        serde_json::from_str(&text)
            .map_err(|e| ApiError::InvalidResponse(format!("{}: {}", url, e)))
    }
}
