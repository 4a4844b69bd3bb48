// Shared integration test fixtures.
// A stub GitHub API on an ephemeral port plus cache and feed helpers.

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::{
    Json, Router,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
};
use serde_json::{Value, json};
use tempfile::TempDir;
use tokio::net::TcpListener;

use showcase::cache::{DEFAULT_TTL, FileCache, GITHUB_NAMESPACE};
use showcase::github::GitHubClient;
use showcase::projects::ProjectFeed;

pub const USERNAME: &str = "octocat";

/// How the stub answers `/users/{user}/repos`.
#[derive(Clone)]
pub enum Scenario {
    Repos(Value),
    RateLimited,
    NotFound,
    ServerError,
    Slow(Duration),
}

struct StubState {
    scenario: Mutex<Scenario>,
    hits: AtomicUsize,
    last_authorization: Mutex<Option<String>>,
}

pub struct StubGitHub {
    pub base_url: String,
    state: Arc<StubState>,
}

impl StubGitHub {
    /// Start the stub on an ephemeral port.
    pub async fn start(scenario: Scenario) -> Self {
        let state = Arc::new(StubState {
            scenario: Mutex::new(scenario),
            hits: AtomicUsize::new(0),
            last_authorization: Mutex::new(None),
        });

        let app = Router::new()
            .route("/users/:username/repos", get(repos_handler))
            .with_state(state.clone());

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        Self {
            base_url: format!("http://{}", addr),
            state,
        }
    }

    pub fn set(&self, scenario: Scenario) {
        *self.state.scenario.lock().unwrap() = scenario;
    }

    pub fn hits(&self) -> usize {
        self.state.hits.load(Ordering::SeqCst)
    }

    pub fn last_authorization(&self) -> Option<String> {
        self.state.last_authorization.lock().unwrap().clone()
    }
}

async fn repos_handler(State(state): State<Arc<StubState>>, headers: HeaderMap) -> Response {
    state.hits.fetch_add(1, Ordering::SeqCst);
    *state.last_authorization.lock().unwrap() = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);

    let scenario = state.scenario.lock().unwrap().clone();
    match scenario {
        Scenario::Repos(body) => (
            StatusCode::OK,
            [
                ("x-ratelimit-limit", "60"),
                ("x-ratelimit-remaining", "59"),
                ("x-ratelimit-reset", "1700000000"),
            ],
            Json(body),
        )
            .into_response(),
        Scenario::RateLimited => (
            StatusCode::FORBIDDEN,
            [
                ("x-ratelimit-limit", "60"),
                ("x-ratelimit-remaining", "0"),
                ("x-ratelimit-reset", "1700000000"),
            ],
            Json(json!({ "message": "API rate limit exceeded" })),
        )
            .into_response(),
        Scenario::NotFound => {
            (StatusCode::NOT_FOUND, Json(json!({ "message": "Not Found" }))).into_response()
        }
        Scenario::ServerError => (StatusCode::BAD_GATEWAY, "upstream unavailable").into_response(),
        Scenario::Slow(delay) => {
            tokio::time::sleep(delay).await;
            (StatusCode::OK, Json(json!([]))).into_response()
        }
    }
}

/// Raw repository row as GitHub returns it.
pub fn repo(name: &str, language: &str, topics: &[&str], updated_at: &str, fork: bool) -> Value {
    json!({
        "id": 1,
        "name": name,
        "description": format!("{} description", name),
        "html_url": format!("https://github.com/{}/{}", USERNAME, name),
        "homepage": null,
        "topics": topics,
        "language": language,
        "updated_at": updated_at,
        "created_at": "2023-01-01T00:00:00Z",
        "stargazers_count": 7,
        "fork": fork,
    })
}

pub fn sample_repos() -> Value {
    json!([
        repo("older-tool", "Rust", &[], "2024-01-10T00:00:00Z", false),
        repo("my-cool-app", "TypeScript", &["cli", "tooling"], "2024-03-01T00:00:00Z", false),
        repo("forked-lib", "Go", &[], "2024-04-01T00:00:00Z", true),
    ])
}

/// Repository cache namespace inside `dir`.
pub fn repo_cache(dir: &TempDir) -> FileCache {
    FileCache::new(dir.path(), DEFAULT_TTL).namespace(GITHUB_NAMESPACE)
}

pub fn feed(stub_url: &str, dir: &TempDir, token: Option<&str>, timeout: Duration) -> ProjectFeed {
    let client = GitHubClient::new(stub_url, token, timeout).unwrap();
    ProjectFeed::new(client, repo_cache(dir), USERNAME)
}

/// Base URL of a port nothing listens on.
pub fn closed_port_url() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{}", addr)
}
