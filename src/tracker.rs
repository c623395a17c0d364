//! Jira REST client.
//!
//! Two operations, both single-shot and stateless:
//!
//! | Operation | Jira endpoint | Result |
//! |-----------|---------------|--------|
//! | [`TrackerClient::probe_connection`] | `GET {api_path}/myself` | [`ConnectionResult`] |
//! | [`TrackerClient::search_issues`] | `POST {api_path}/search/jql` | [`SearchResult`] |
//!
//! Every call builds its own HTTP client and authenticates with basic auth
//! (email as username, API token as password). There is no retry, no
//! backoff and no session reuse: a failed call is reported immediately.
//!
//! # Error Contract
//!
//! Failures from either operation go through [`normalize_error`], which
//! produces the HTTP status and message for the caller:
//!
//! | Error | Status | Message |
//! |-------|--------|---------|
//! | [`TrackerError::Validation`] | 400 | `baseUrl, email and apiKey are required` |
//! | [`TrackerError::Transport`] | 500 | `<op> failed: 500 Unknown error - {}` |
//! | [`TrackerError::Api`] | Jira's status | `<op> failed: <status> <reason> - <body>` |
//! | [`TrackerError::Unexpected`] | 500 | the error text |
//!
//! where `<op>` is `Jira connection` or `Jira search`.

use reqwest::RequestBuilder;
use serde_json::{json, Value};
use thiserror::Error;

use crate::adf::description_to_text;
use crate::config::TrackerConfig;
use crate::models::{
    ConnectionResult, NormalizedStory, SearchQuery, SearchResult, TrackerCredentials, TrackerUser,
};

/// Message returned when any credential field is missing.
pub const VALIDATION_MESSAGE: &str = "baseUrl, email and apiKey are required";

/// Fields requested from the search endpoint.
pub const SEARCH_FIELDS: [&str; 4] = ["summary", "description", "status", "reporter"];

const TRANSPORT_STATUS: u16 = 500;
const TRANSPORT_STATUS_TEXT: &str = "Unknown error";

/// Failure of a tracker operation, before normalization.
#[derive(Debug, Error)]
pub enum TrackerError {
    /// A credential field was empty. No request was sent.
    #[error("{}", VALIDATION_MESSAGE)]
    Validation,
    /// No response was received (DNS, connect, TLS, timeout).
    #[error("transport error: {0}")]
    Transport(String),
    /// Jira answered with a non-success status.
    #[error("Jira responded {status} {status_text}")]
    Api {
        status: u16,
        status_text: String,
        /// Response body rendered as a string.
        body: String,
    },
    /// Anything outside the HTTP exchange itself.
    #[error("{0}")]
    Unexpected(String),
}

/// Which operation failed; selects the message prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackerOperation {
    Connection,
    Search,
}

impl TrackerOperation {
    pub fn label(self) -> &'static str {
        match self {
            TrackerOperation::Connection => "Jira connection",
            TrackerOperation::Search => "Jira search",
        }
    }

    fn unexpected_fallback(self) -> &'static str {
        match self {
            TrackerOperation::Connection => "Unexpected error testing Jira connection",
            TrackerOperation::Search => "Unexpected error searching Jira stories",
        }
    }
}

/// Caller-facing form of a [`TrackerError`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedError {
    pub status: u16,
    pub message: String,
}

/// Maps a tracker failure to an HTTP status and message.
///
/// Both operations use this function, so their messages differ only by
/// the operation label.
pub fn normalize_error(operation: TrackerOperation, error: &TrackerError) -> NormalizedError {
    match error {
        TrackerError::Validation => NormalizedError {
            status: 400,
            message: VALIDATION_MESSAGE.to_string(),
        },
        TrackerError::Transport(_) => NormalizedError {
            status: TRANSPORT_STATUS,
            message: format!(
                "{} failed: {} {} - {{}}",
                operation.label(),
                TRANSPORT_STATUS,
                TRANSPORT_STATUS_TEXT
            ),
        },
        TrackerError::Api {
            status,
            status_text,
            body,
        } => NormalizedError {
            status: *status,
            message: format!(
                "{} failed: {} {} - {}",
                operation.label(),
                status,
                status_text,
                body
            ),
        },
        TrackerError::Unexpected(message) => NormalizedError {
            status: 500,
            message: if message.is_empty() {
                operation.unexpected_fallback().to_string()
            } else {
                message.clone()
            },
        },
    }
}

/// Renders an error response body for inclusion in a message.
///
/// JSON strings are used as-is, other JSON values are re-serialized
/// compactly, `null` becomes `{}` and non-JSON text is kept verbatim.
fn render_body(raw: &str) -> String {
    if raw.is_empty() {
        return String::new();
    }
    match serde_json::from_str::<Value>(raw) {
        Ok(Value::String(s)) => s,
        Ok(Value::Null) => "{}".to_string(),
        Ok(other) => other.to_string(),
        Err(_) => raw.to_string(),
    }
}

/// Client for the Jira REST API.
///
/// Holds only configuration; credentials are passed per call.
#[derive(Debug, Clone, Default)]
pub struct TrackerClient {
    config: TrackerConfig,
}

impl TrackerClient {
    pub fn new(config: TrackerConfig) -> Self {
        Self { config }
    }

    /// Verifies the credentials against `GET /myself`.
    pub async fn probe_connection(&self, credentials: &TrackerCredentials) -> ConnectionResult {
        match self.fetch_current_user(credentials).await {
            Ok(user) => {
                let message = format!(
                    "Connected to Jira as {}",
                    user.display_name.as_deref().unwrap_or_default()
                );
                tracing::info!(account_id = ?user.account_id, "Jira connection succeeded");
                ConnectionResult {
                    status: 200,
                    success: true,
                    message: Some(message),
                    user: Some(user),
                    error: None,
                }
            }
            Err(e) => {
                let normalized = normalize_error(TrackerOperation::Connection, &e);
                tracing::warn!(status = normalized.status, error = %e, "Jira connection failed");
                ConnectionResult {
                    status: normalized.status,
                    success: false,
                    message: None,
                    user: None,
                    error: Some(normalized.message),
                }
            }
        }
    }

    /// Runs a JQL search and flattens each issue's description.
    pub async fn search_issues(
        &self,
        credentials: &TrackerCredentials,
        query: &SearchQuery,
    ) -> SearchResult {
        match self.fetch_stories(credentials, query).await {
            Ok(stories) => {
                tracing::info!(count = stories.len(), "Jira search succeeded");
                SearchResult {
                    status: 200,
                    success: true,
                    issues: Some(stories),
                    error: None,
                }
            }
            Err(e) => {
                let normalized = normalize_error(TrackerOperation::Search, &e);
                tracing::warn!(status = normalized.status, error = %e, "Jira search failed");
                SearchResult {
                    status: normalized.status,
                    success: false,
                    issues: None,
                    error: Some(normalized.message),
                }
            }
        }
    }

    /// Fetches the authenticated account.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerError::Validation`] before any request when a
    /// credential field is empty; transport and API failures otherwise.
    pub async fn fetch_current_user(
        &self,
        credentials: &TrackerCredentials,
    ) -> Result<TrackerUser, TrackerError> {
        if !credentials.is_complete() {
            return Err(TrackerError::Validation);
        }

        let url = self.endpoint(credentials, "/myself");
        tracing::debug!(%url, "probing Jira connection");

        let client = http_client()?;
        let request = client
            .get(&url)
            .basic_auth(&credentials.identity, Some(&credentials.secret));
        let body = send(request).await?;

        Ok(TrackerUser {
            display_name: string_field(&body, "displayName"),
            email_address: string_field(&body, "emailAddress"),
            account_id: string_field(&body, "accountId"),
        })
    }

    /// Searches issues and returns them as [`NormalizedStory`] records in
    /// the order Jira returned them.
    ///
    /// # Errors
    ///
    /// Same as [`fetch_current_user`](Self::fetch_current_user). Malformed
    /// descriptions never cause an error.
    pub async fn fetch_stories(
        &self,
        credentials: &TrackerCredentials,
        query: &SearchQuery,
    ) -> Result<Vec<NormalizedStory>, TrackerError> {
        if !credentials.is_complete() {
            return Err(TrackerError::Validation);
        }

        let url = self.endpoint(credentials, "/search/jql");
        let payload = self.search_request_body(query);
        tracing::debug!(%url, jql = %payload["jql"], max_results = %payload["maxResults"], "searching Jira");

        let client = http_client()?;
        let request = client
            .post(&url)
            .basic_auth(&credentials.identity, Some(&credentials.secret))
            .header("Accept", "application/json")
            .header("Content-Type", "application/json")
            .json(&payload);
        let body = send(request).await?;

        Ok(normalize_issues(&body))
    }

    /// Builds the JSON body for the search endpoint, applying the
    /// configured defaults.
    pub fn search_request_body(&self, query: &SearchQuery) -> Value {
        let jql = query
            .jql
            .as_deref()
            .filter(|q| !q.is_empty())
            .unwrap_or(&self.config.default_jql);
        let max_results = query
            .max_results
            .clone()
            .unwrap_or_else(|| self.config.default_max_results.into());

        json!({
            "fields": SEARCH_FIELDS,
            "jql": jql,
            "maxResults": max_results,
        })
    }

    fn endpoint(&self, credentials: &TrackerCredentials, path: &str) -> String {
        format!(
            "{}{}{}",
            credentials.normalized_base_url(),
            self.config.api_path.trim_end_matches('/'),
            path
        )
    }
}

fn http_client() -> Result<reqwest::Client, TrackerError> {
    reqwest::Client::builder()
        .user_agent(concat!("story-intake/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(|e| TrackerError::Unexpected(e.to_string()))
}

/// Sends a request and returns the parsed JSON body of a success response.
///
/// A success body that is not JSON parses as `null`, which downstream
/// lookups treat as missing fields.
async fn send(request: RequestBuilder) -> Result<Value, TrackerError> {
    let response = request
        .send()
        .await
        .map_err(|e| TrackerError::Transport(e.to_string()))?;

    let status = response.status();
    if !status.is_success() {
        let raw = response.text().await.unwrap_or_default();
        return Err(TrackerError::Api {
            status: status.as_u16(),
            status_text: status.canonical_reason().unwrap_or_default().to_string(),
            body: render_body(&raw),
        });
    }

    let raw = response
        .text()
        .await
        .map_err(|e| TrackerError::Transport(e.to_string()))?;
    Ok(serde_json::from_str(&raw).unwrap_or(Value::Null))
}

fn string_field(value: &Value, name: &str) -> Option<String> {
    value.get(name).and_then(Value::as_str).map(str::to_string)
}

/// Maps a search response to stories. A missing or non-array `issues`
/// field yields no stories.
pub fn normalize_issues(body: &Value) -> Vec<NormalizedStory> {
    let Some(issues) = body.get("issues").and_then(Value::as_array) else {
        return Vec::new();
    };

    issues
        .iter()
        .map(|issue| {
            let fields = issue.get("fields");
            NormalizedStory {
                key: string_field(issue, "key").unwrap_or_default(),
                summary: fields
                    .and_then(|f| string_field(f, "summary"))
                    .unwrap_or_default(),
                description_text: description_to_text(fields.and_then(|f| f.get("description"))),
            }
        })
        .collect()
}
