//! API client for the credential service.
//!
//! Every operation is a single request/response exchange. Failures are
//! surfaced to the caller, never retried.

use std::future::Future;
use std::time::Duration;

use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::models::AgentRecord;

use super::{ApiBase, ApiError};

// ============================================================================
// Constants
// ============================================================================

/// HTTP request timeout in seconds.
/// 30s allows for slow API responses while failing fast enough for good UX.
pub const REQUEST_TIMEOUT_SECS: u64 = 30;

const LOGIN_PATH: &str = "/login";
const LOOKUP_PATH: &str = "/getAgent";
const ADD_AGENT_PATH: &str = "/addAgent";

#[derive(Debug, Serialize)]
struct LoginRequest<'a> {
    username: &'a str,
    password: &'a str,
}

#[derive(Debug, Deserialize)]
struct LoginResponse {
    token: Option<String>,
}

/// Opaque bearer credential returned by a successful login.
#[derive(Clone, PartialEq, Eq)]
pub struct AuthToken(String);

impl AuthToken {
    /// Wrap a raw token; empty or blank tokens are not credentials.
    pub fn new(raw: impl Into<String>) -> Option<Self> {
        let raw = raw.into();
        if raw.trim().is_empty() {
            None
        } else {
            Some(Self(raw))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for AuthToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("AuthToken(***)")
    }
}

/// Result of a lookup that reached the server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LookupOutcome {
    Found(AgentRecord),
    NotFound,
}

/// The login half of the API, split out so the session controller can be
/// driven by something other than a live HTTP client.
pub trait Authenticator {
    fn authenticate(
        &self,
        username: &str,
        password: &str,
    ) -> impl Future<Output = Result<AuthToken, ApiError>> + Send;
}

/// API client for the credential service.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base: ApiBase,
}

impl ApiClient {
    /// Create a new API client targeting an already-resolved base.
    pub fn new(base: ApiBase) -> Result<Self, ApiError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;

        Ok(Self { client, base })
    }

    pub fn base(&self) -> &ApiBase {
        &self.base
    }

    /// POST credentials and return the bearer token.
    ///
    /// Any non-success status, and a success body without a usable token, is
    /// an `AuthFailure`. Transport failures stay `Transient`.
    pub async fn login(&self, username: &str, password: &str) -> Result<AuthToken, ApiError> {
        let url = self.base.url(LOGIN_PATH);

        let response = self
            .client
            .post(&url)
            .json(&LoginRequest { username, password })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            debug!(%status, "Login rejected");
            return Err(ApiError::AuthFailure);
        }

        let body: LoginResponse = response.json().await.map_err(|e| {
            warn!(error = %e, "Failed to parse login response");
            ApiError::AuthFailure
        })?;

        body.token.and_then(AuthToken::new).ok_or_else(|| {
            warn!("Login succeeded without a token");
            ApiError::AuthFailure
        })
    }

    /// GET a record by extension. 404 is a valid negative answer.
    pub async fn lookup(&self, extension: &str) -> Result<LookupOutcome, ApiError> {
        let url = self.base.url(LOOKUP_PATH);

        let response = self
            .client
            .get(&url)
            .query(&[("ramal", extension)])
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            debug!(extension, "Extension not found");
            return Ok(LookupOutcome::NotFound);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let err = ApiError::from_status(status, &body);
            warn!(extension, error = %err, "Lookup failed");
            // Only a 404 is a negative result; every other failure is transient
            return Err(ApiError::Transient(err.to_string()));
        }

        let text = response.text().await?;
        let record: AgentRecord = serde_json::from_str(&text).map_err(|e| {
            warn!(extension, error = %e, "Failed to parse agent record");
            ApiError::Transient(format!("Invalid response: {}", e))
        })?;

        Ok(LookupOutcome::Found(record))
    }

    /// POST a new record with the admin bearer token.
    pub async fn add_record(&self, record: &AgentRecord, token: &AuthToken) -> Result<(), ApiError> {
        let url = self.base.url(ADD_AGENT_PATH);

        let response = self
            .client
            .post(&url)
            .bearer_auth(token.as_str())
            .json(record)
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            debug!(extension = record.extension, "Agent added");
            return Ok(());
        }

        let body = response.text().await.unwrap_or_default();
        let err = match ApiError::from_status(status, &body) {
            // addAgent has no negative-lookup meaning; a 404 is a rejection
            ApiError::NotFound => ApiError::Validation(
                ApiError::server_message(&body)
                    .unwrap_or_else(|| super::error::GENERIC_ADD_ERROR.to_string()),
            ),
            other => other,
        };
        warn!(extension = record.extension, %status, error = %err, "Add agent failed");
        Err(err)
    }
}

impl Authenticator for ApiClient {
    fn authenticate(
        &self,
        username: &str,
        password: &str,
    ) -> impl Future<Output = Result<AuthToken, ApiError>> + Send {
        self.login(username, password)
    }
}
