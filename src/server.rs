//! HTTP API consumed by the story-import form.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `POST` | `/api/jira/test-connection` | Verify Jira credentials |
//! | `POST` | `/api/jira/search-stories` | Search issues and return plain-text stories |
//! | `GET`  | `/health` | Health check (returns version) |
//!
//! # Request Bodies
//!
//! ```json
//! { "baseUrl": "https://acme.atlassian.net", "email": "me@acme.io", "apiKey": "..." }
//! ```
//!
//! `search-stories` additionally accepts optional `jql` and `maxResults`.
//!
//! # Error Contract
//!
//! Every response carries `success`. Failures add an `error` string:
//!
//! ```json
//! { "success": false, "error": "Jira search failed: 401 Unauthorized - {\"message\":\"Unauthorized\"}" }
//! ```
//!
//! Missing credential fields or an unparseable body produce `400`. Jira
//! failures mirror Jira's own status; transport failures produce `500`.
//!
//! # CORS
//!
//! All origins, methods, and headers are permitted so the browser form can
//! be served from a different origin.

use anyhow::Context;
use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

use crate::config::Config;
use crate::models::{ConnectionResult, SearchQuery, SearchResult, TrackerCredentials};
use crate::tracker::TrackerClient;

/// Shared application state passed to all route handlers via Axum's `State` extractor.
#[derive(Clone)]
struct AppState {
    tracker: Arc<TrackerClient>,
}

/// Starts the HTTP server on `[server].bind`.
///
/// Runs until the process is terminated.
///
/// # Errors
///
/// Returns an error if the address cannot be bound.
pub async fn run_server(config: &Config) -> anyhow::Result<()> {
    let bind_addr = config.server.bind.clone();
    let app = build_router(config);

    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("Failed to bind {}", bind_addr))?;

    println!("story-intake listening on http://{}", bind_addr);
    tracing::info!(%bind_addr, "server started");

    axum::serve(listener, app).await?;

    Ok(())
}

/// Builds the application router. Exposed for embedding in another server.
pub fn build_router(config: &Config) -> Router {
    let state = AppState {
        tracker: Arc::new(TrackerClient::new(config.tracker.clone())),
    };

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let jira = Router::new()
        .route("/test-connection", post(handle_test_connection))
        .route("/search-stories", post(handle_search_stories));

    Router::new()
        .nest("/api/jira", jira)
        .route("/health", get(handle_health))
        .layer(cors)
        .with_state(state)
}

fn respond<T: Serialize>(status: u16, body: T) -> Response {
    let status = StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, Json(body)).into_response()
}

// ============ GET /health ============

#[derive(Serialize)]
struct HealthResponse {
    status: String,
    version: String,
}

async fn handle_health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

// ============ POST /api/jira/test-connection ============

/// Handler for `POST /api/jira/test-connection`.
///
/// Returns `200` with the connected user, or the normalized error with the
/// status Jira answered.
async fn handle_test_connection(
    State(state): State<AppState>,
    payload: Result<Json<TrackerCredentials>, JsonRejection>,
) -> Response {
    let credentials = match payload {
        Ok(Json(credentials)) => credentials,
        Err(rejection) => {
            tracing::debug!(error = %rejection, "rejected test-connection body");
            return respond(
                400,
                ConnectionResult {
                    status: 400,
                    success: false,
                    message: None,
                    user: None,
                    error: Some(rejection.body_text()),
                },
            );
        }
    };

    let result = state.tracker.probe_connection(&credentials).await;
    respond(result.status, result)
}

// ============ POST /api/jira/search-stories ============

/// Body of `POST /api/jira/search-stories`.
#[derive(Deserialize)]
struct SearchStoriesRequest {
    #[serde(flatten)]
    credentials: TrackerCredentials,
    #[serde(default)]
    jql: Option<Value>,
    /// Kept loose so a non-numeric value falls back to the default instead
    /// of failing the request.
    #[serde(default, rename = "maxResults")]
    max_results: Option<Value>,
}

impl SearchStoriesRequest {
    fn query(&self) -> SearchQuery {
        SearchQuery {
            jql: self.jql.as_ref().and_then(jql_text),
            max_results: match &self.max_results {
                Some(Value::Number(n)) => Some(n.clone()),
                _ => None,
            },
        }
    }
}

/// Text of an inbound `jql` value. `null`, `false` and zero select the
/// default; other non-string values are sent as their JSON text.
fn jql_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Null | Value::Bool(false) => None,
        Value::Number(n) if n.as_f64() == Some(0.0) => None,
        other => Some(other.to_string()),
    }
}

/// Handler for `POST /api/jira/search-stories`.
async fn handle_search_stories(
    State(state): State<AppState>,
    payload: Result<Json<SearchStoriesRequest>, JsonRejection>,
) -> Response {
    let request = match payload {
        Ok(Json(request)) => request,
        Err(rejection) => {
            tracing::debug!(error = %rejection, "rejected search-stories body");
            return respond(
                400,
                SearchResult {
                    status: 400,
                    success: false,
                    issues: None,
                    error: Some(rejection.body_text()),
                },
            );
        }
    };

    let result = state
        .tracker
        .search_issues(&request.credentials, &request.query())
        .await;
    respond(result.status, result)
}
