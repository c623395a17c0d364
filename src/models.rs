//! Data types exchanged with Jira and with callers of the integration layer.
//!
//! Wire names follow the JSON the browser form sends and expects
//! (`baseUrl`, `email`, `apiKey`, `descriptionText`, ...).

use serde::{Deserialize, Deserializer, Serialize};

/// Per-request Jira credentials. Never stored.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TrackerCredentials {
    #[serde(rename = "baseUrl", default, deserialize_with = "null_as_empty")]
    pub base_url: String,
    /// Account email, used as the basic-auth username.
    #[serde(rename = "email", default, deserialize_with = "null_as_empty")]
    pub identity: String,
    /// API token, used as the basic-auth password.
    #[serde(rename = "apiKey", default, deserialize_with = "null_as_empty")]
    pub secret: String,
}

/// Reads `null` as an empty string so it fails the same completeness check
/// as a missing field.
fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

impl TrackerCredentials {
    pub fn new(
        base_url: impl Into<String>,
        identity: impl Into<String>,
        secret: impl Into<String>,
    ) -> Self {
        Self {
            base_url: base_url.into(),
            identity: identity.into(),
            secret: secret.into(),
        }
    }

    /// True when every field is non-empty.
    pub fn is_complete(&self) -> bool {
        !self.base_url.is_empty() && !self.identity.is_empty() && !self.secret.is_empty()
    }

    /// Base URL with all trailing slashes removed.
    pub fn normalized_base_url(&self) -> &str {
        self.base_url.trim_end_matches('/')
    }

    /// Copy with surrounding whitespace removed from every field.
    pub fn trimmed(&self) -> Self {
        Self {
            base_url: self.base_url.trim().to_string(),
            identity: self.identity.trim().to_string(),
            secret: self.secret.trim().to_string(),
        }
    }
}

/// Optional search parameters supplied by the caller.
#[derive(Debug, Clone, Default)]
pub struct SearchQuery {
    /// JQL query; `None` or empty falls back to the configured default.
    pub jql: Option<String>,
    /// Result cap; `None` falls back to the configured default. Any JSON
    /// number is forwarded as given and Jira applies its own bounds.
    pub max_results: Option<serde_json::Number>,
}

/// The authenticated account reported by `GET /myself`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackerUser {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email_address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub account_id: Option<String>,
}

/// A Jira issue flattened for downstream consumption.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedStory {
    pub key: String,
    pub summary: String,
    pub description_text: String,
}

/// Outcome of a connection probe, ready to be sent as an HTTP response.
#[derive(Debug, Clone, Serialize)]
pub struct ConnectionResult {
    /// HTTP status for the inbound response. Not serialized.
    #[serde(skip)]
    pub status: u16,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<TrackerUser>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Outcome of an issue search, ready to be sent as an HTTP response.
#[derive(Debug, Clone, Serialize)]
pub struct SearchResult {
    /// HTTP status for the inbound response. Not serialized.
    #[serde(skip)]
    pub status: u16,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub issues: Option<Vec<NormalizedStory>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Input of the test-case generation service.
///
/// Only the shape is modelled here; the generator itself lives elsewhere.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateRequest {
    pub story_title: String,
    pub acceptance_criteria: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub additional_info: String,
}

impl GenerateRequest {
    /// Pre-fills a generation form from an imported story: the summary
    /// becomes the title and the description text becomes the acceptance
    /// criteria.
    pub fn from_story(story: &NormalizedStory) -> Self {
        Self {
            story_title: story.summary.clone(),
            acceptance_criteria: story.description_text.clone(),
            ..Self::default()
        }
    }
}
