//! In-process fake of the Jira REST endpoints used by story-intake.
#![allow(dead_code)]

use axum::{
    extract::State,
    http::{header::AUTHORIZATION, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

pub const EMAIL: &str = "me@acme.io";
pub const TOKEN: &str = "secret-token";
/// `Basic base64("me@acme.io:secret-token")`.
const EXPECTED_AUTH: &str = "Basic bWVAYWNtZS5pbzpzZWNyZXQtdG9rZW4=";

/// Records every request the fake receives.
#[derive(Clone, Default)]
pub struct Recorder {
    hits: Arc<AtomicUsize>,
    search_bodies: Arc<Mutex<Vec<Value>>>,
}

impl Recorder {
    pub fn hits(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }

    pub fn last_search_body(&self) -> Option<Value> {
        self.search_bodies.lock().unwrap().last().cloned()
    }
}

fn authorized(headers: &HeaderMap) -> bool {
    headers.get(AUTHORIZATION).and_then(|v| v.to_str().ok()) == Some(EXPECTED_AUTH)
}

fn unauthorized() -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({ "message": "Unauthorized" })),
    )
        .into_response()
}

async fn myself(State(rec): State<Recorder>, headers: HeaderMap) -> Response {
    rec.hits.fetch_add(1, Ordering::SeqCst);
    if !authorized(&headers) {
        return unauthorized();
    }
    Json(json!({
        "self": "https://acme.atlassian.net/rest/api/3/user?accountId=5b10ac8d82e05b22cc7d4ef5",
        "accountId": "5b10ac8d82e05b22cc7d4ef5",
        "emailAddress": EMAIL,
        "displayName": "Ada Lovelace",
        "active": true
    }))
    .into_response()
}

async fn search(
    State(rec): State<Recorder>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    rec.hits.fetch_add(1, Ordering::SeqCst);
    rec.search_bodies.lock().unwrap().push(body);
    if !authorized(&headers) {
        return unauthorized();
    }
    Json(sample_search_response()).into_response()
}

/// A search response with one well-formed story, one story whose
/// description is malformed, and one story with no fields at all.
pub fn sample_search_response() -> Value {
    json!({
        "isLast": true,
        "issues": [
            {
                "id": "10001",
                "key": "GEN-1",
                "fields": {
                    "summary": "User can reset password",
                    "status": { "name": "To Do" },
                    "description": {
                        "type": "doc",
                        "version": 1,
                        "content": [
                            { "type": "paragraph", "content": [
                                { "type": "text", "text": "As a user, " },
                                { "type": "text", "text": "I want to reset my password", "marks": [{ "type": "strong" }] }
                            ]},
                            { "type": "paragraph", "content": [] },
                            { "type": "bulletList", "content": [
                                { "type": "listItem", "content": [
                                    { "type": "paragraph", "content": [{ "type": "text", "text": "Email link expires in 1h" }] }
                                ]}
                            ]}
                        ]
                    }
                }
            },
            {
                "id": "10002",
                "key": "GEN-2",
                "fields": { "summary": "Broken description", "description": 17 }
            },
            { "id": "10003" }
        ]
    })
}

/// Builds the fake Jira router.
pub fn fake_jira(rec: Recorder) -> Router {
    Router::new()
        .route("/rest/api/3/myself", get(myself))
        .route("/rest/api/3/search/jql", post(search))
        .with_state(rec)
}

/// Serves `app` on an ephemeral port and returns its base URL.
pub async fn spawn(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.ok();
    });
    format!("http://{}", addr)
}

/// Starts a fake Jira and returns its base URL and recorder.
pub async fn start_fake_jira() -> (String, Recorder) {
    let rec = Recorder::default();
    let url = spawn(fake_jira(rec.clone())).await;
    (url, rec)
}

/// A base URL on which nothing is listening.
pub fn dead_base_url() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    format!("http://127.0.0.1:{}", port)
}

pub fn find_free_port() -> u16 {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    listener.local_addr().unwrap().port()
}
