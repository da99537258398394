//! API client for communicating with the LoveSync REST API.
//!
//! Endpoints are resolved relative to a configurable base URL (for example
//! `http://127.0.0.1:8000/api/`). Requests are sent once: there is no retry,
//! backoff or cancellation.

use std::time::Duration;

use reqwest::{header, Client, Url};
use serde::{de::DeserializeOwned, Serialize};
use tracing::debug;

use crate::models::{Credentials, LoginResponse, ProfileResponse, Registration};

use super::ApiError;

// ============================================================================
// Constants
// ============================================================================

/// Token (login) endpoint, relative to the API base URL
pub const TOKEN_ENDPOINT: &str = "core/token/";

/// Registration endpoint, relative to the API base URL
pub const REGISTER_ENDPOINT: &str = "core/register/register/";

/// Current-user profile endpoint, relative to the API base URL
pub const PROFILE_ENDPOINT: &str = "core/profile/me/";

/// HTTP request timeout in seconds.
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// API client for the LoveSync backend.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: Url,
    token: Option<String>,
}

impl ApiClient {
    /// Create a new API client rooted at `base_url`
    pub fn new(base_url: &str) -> Result<Self, ApiError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            client,
            base_url: Self::normalize_base(base_url)?,
            token: None,
        })
    }

    /// Parse the base URL, making sure it ends in `/` so relative endpoints
    /// join underneath it instead of replacing its last segment.
    fn normalize_base(base_url: &str) -> Result<Url, ApiError> {
        let trimmed = base_url.trim();
        let with_slash = if trimmed.ends_with('/') {
            trimmed.to_string()
        } else {
            format!("{}/", trimmed)
        };
        Url::parse(&with_slash)
            .map_err(|e| ApiError::InvalidRequest(format!("Invalid API base URL {}: {}", trimmed, e)))
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Set or clear the bearer token for authenticated requests
    pub fn set_token(&mut self, token: Option<String>) {
        self.token = token.filter(|t| !t.is_empty());
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    fn endpoint(&self, path: &str) -> Result<Url, ApiError> {
        self.base_url
            .join(path)
            .map_err(|e| ApiError::InvalidRequest(format!("Invalid endpoint {}: {}", path, e)))
    }

    fn auth_headers(&self) -> Result<header::HeaderMap, ApiError> {
        let mut headers = header::HeaderMap::new();
        if let Some(ref token) = self.token {
            let value = header::HeaderValue::from_str(&format!("Bearer {}", token))
                .map_err(|_| ApiError::InvalidRequest("Token is not a valid header value".to_string()))?;
            headers.insert(header::AUTHORIZATION, value);
        }
        Ok(headers)
    }

    /// Check if response is successful, returning an error with body if not.
    async fn check_response(response: reqwest::Response) -> Result<reqwest::Response, ApiError> {
        if response.status().is_success() {
            Ok(response)
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            Err(ApiError::from_status(status, &body))
        }
    }

    async fn parse_json<T: DeserializeOwned>(response: reqwest::Response, url: &Url) -> Result<T, ApiError> {
        let bytes = response.bytes().await?;
        serde_json::from_slice(&bytes).map_err(|e| {
            ApiError::InvalidResponse(format!("Failed to parse JSON response from {}: {}", url, e))
        })
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let url = self.endpoint(path)?;
        debug!(url = %url, authenticated = self.token.is_some(), "GET");

        let response = self
            .client
            .get(url.clone())
            .headers(self.auth_headers()?)
            .send()
            .await?;

        let response = Self::check_response(response).await?;
        Self::parse_json(response, &url).await
    }

    async fn post<T: DeserializeOwned, B: Serialize>(&self, path: &str, body: &B) -> Result<T, ApiError> {
        let url = self.endpoint(path)?;
        debug!(url = %url, authenticated = self.token.is_some(), "POST");

        let response = self
            .client
            .post(url.clone())
            .headers(self.auth_headers()?)
            .json(body)
            .send()
            .await?;

        let response = Self::check_response(response).await?;
        Self::parse_json(response, &url).await
    }

    // ===== Endpoints =====

    /// Exchange credentials for an access token and the user record
    pub async fn obtain_token(&self, credentials: &Credentials) -> Result<LoginResponse, ApiError> {
        self.post(TOKEN_ENDPOINT, credentials).await
    }

    /// Create a new account; the success payload is passed through untouched
    pub async fn register(&self, registration: &Registration) -> Result<serde_json::Value, ApiError> {
        self.post(REGISTER_ENDPOINT, registration).await
    }

    /// Fetch the profile of the user the current token belongs to
    pub async fn fetch_profile(&self) -> Result<ProfileResponse, ApiError> {
        self.get(PROFILE_ENDPOINT).await
    }
}
