// Project feed integration tests.
// Read-through, stale fallback, and failure classification against a stub GitHub API.

mod common;

use std::time::Duration;

use reqwest::StatusCode;
use tempfile::TempDir;

use showcase::cache::repos_key;
use showcase::github::FailureKind;
use showcase::projects::{FeedSource, Project};

use common::{Scenario, StubGitHub, USERNAME, feed, repo_cache, sample_repos};

const TIMEOUT: Duration = Duration::from_secs(5);

/// Seed the cache with an entry that is already expired.
fn seed_stale(dir: &TempDir) -> Vec<Project> {
    let projects = vec![Project {
        title: "Cached Project".to_string(),
        description: "from an earlier fetch".to_string(),
        tags: vec!["Rust".to_string()],
        links: Default::default(),
        gradient: "none".to_string(),
        updated_at: chrono::Utc::now(),
        stars: 1,
    }];
    repo_cache(dir).set(&repos_key(USERNAME), &projects, Some(Duration::ZERO));
    projects
}

#[tokio::test]
async fn test_live_fetch_then_cache_hit() {
    let temp_dir = TempDir::new().unwrap();
    let stub = StubGitHub::start(Scenario::Repos(sample_repos())).await;
    let feed = feed(&stub.base_url, &temp_dir, None, TIMEOUT);

    let first = feed.fetch().await;
    assert_eq!(first.source, FeedSource::Live);
    assert_eq!(first.http_status(), StatusCode::OK);
    assert_eq!(first.projects.len(), 2);
    assert_eq!(first.projects[0].title, "My Cool App");
    assert_eq!(
        first.projects[0].tags,
        vec!["TypeScript", "React", "Next.js", "cli", "tooling"]
    );
    assert_eq!(first.projects[1].title, "Older Tool");
    assert_eq!(first.rate_limit.as_ref().unwrap().remaining, Some(59));
    assert!(first.error.is_none());

    let info = feed.cache_info();
    assert!(info.is_fresh());

    let second = feed.fetch().await;
    assert_eq!(second.source, FeedSource::Cache);
    assert_eq!(second.projects, first.projects);
    assert_eq!(second.performance.cache_ttl_ms, Some(3_600_000));
    assert!(second.performance.cache_age_ms.is_some());
    assert_eq!(stub.hits(), 1);
}

#[tokio::test]
async fn test_expired_cache_is_refreshed() {
    let temp_dir = TempDir::new().unwrap();
    seed_stale(&temp_dir);
    let stub = StubGitHub::start(Scenario::Repos(sample_repos())).await;
    let feed = feed(&stub.base_url, &temp_dir, None, TIMEOUT);

    let response = feed.fetch().await;
    assert_eq!(response.source, FeedSource::Live);
    assert_eq!(response.projects[0].title, "My Cool App");
    assert!(feed.cache_info().is_fresh());
}

#[tokio::test]
async fn test_rate_limited_without_cache() {
    let temp_dir = TempDir::new().unwrap();
    let stub = StubGitHub::start(Scenario::RateLimited).await;
    let feed = feed(&stub.base_url, &temp_dir, None, TIMEOUT);

    let response = feed.fetch().await;
    assert_eq!(response.source, FeedSource::Error);
    assert_eq!(response.http_status(), StatusCode::TOO_MANY_REQUESTS);
    assert!(response.projects.is_empty());

    let failure = response.error.unwrap();
    assert_eq!(failure.kind, FailureKind::RateLimit);
    assert!(!failure.can_retry);
    assert_eq!(failure.status, Some(403));
    assert!(failure.reset_at.is_some());
}

#[tokio::test]
async fn test_timeout_serves_stale_cache() {
    let temp_dir = TempDir::new().unwrap();
    let cached = seed_stale(&temp_dir);
    let stub = StubGitHub::start(Scenario::Slow(Duration::from_secs(3))).await;
    let feed = feed(&stub.base_url, &temp_dir, None, Duration::from_millis(200));

    let response = feed.fetch().await;
    assert_eq!(response.source, FeedSource::StaleCache);
    assert_eq!(response.http_status(), StatusCode::OK);
    assert_eq!(response.projects, cached);
    assert!(response.error.is_none());

    let warning = response.warning.unwrap();
    assert_eq!(warning.kind, FailureKind::Timeout);
    assert!(warning.can_retry);

    // The stale entry is kept for the next fallback.
    assert!(feed.cache_info().exists);
}

#[tokio::test]
async fn test_timeout_without_cache() {
    let temp_dir = TempDir::new().unwrap();
    let stub = StubGitHub::start(Scenario::Slow(Duration::from_secs(3))).await;
    let feed = feed(&stub.base_url, &temp_dir, None, Duration::from_millis(200));

    let response = feed.fetch().await;
    assert_eq!(response.source, FeedSource::Error);
    assert_eq!(response.http_status(), StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(response.error.unwrap().kind, FailureKind::Timeout);
}

#[tokio::test]
async fn test_not_found() {
    let temp_dir = TempDir::new().unwrap();
    let stub = StubGitHub::start(Scenario::NotFound).await;
    let feed = feed(&stub.base_url, &temp_dir, None, TIMEOUT);

    let response = feed.fetch().await;
    let failure = response.error.clone().unwrap();
    assert_eq!(failure.kind, FailureKind::NotFound);
    assert!(!failure.can_retry);
    assert_eq!(response.http_status(), StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn test_server_error_serves_stale_cache() {
    let temp_dir = TempDir::new().unwrap();
    let cached = seed_stale(&temp_dir);
    let stub = StubGitHub::start(Scenario::ServerError).await;
    let feed = feed(&stub.base_url, &temp_dir, None, TIMEOUT);

    let response = feed.fetch().await;
    assert_eq!(response.source, FeedSource::StaleCache);
    assert_eq!(response.projects, cached);
    assert_eq!(response.warning.unwrap().kind, FailureKind::Server);
}

#[tokio::test]
async fn test_connection_refused_is_network() {
    let temp_dir = TempDir::new().unwrap();
    let feed = feed(&common::closed_port_url(), &temp_dir, None, TIMEOUT);

    let response = feed.fetch().await;
    let failure = response.error.unwrap();
    assert_eq!(failure.kind, FailureKind::Network);
    assert!(failure.can_retry);
}

#[tokio::test]
async fn test_authorization_scheme_follows_token_prefix() {
    let stub = StubGitHub::start(Scenario::Repos(sample_repos())).await;

    let temp_dir = TempDir::new().unwrap();
    feed(&stub.base_url, &temp_dir, None, TIMEOUT).fetch().await;
    assert_eq!(stub.last_authorization(), None);

    let temp_dir = TempDir::new().unwrap();
    feed(&stub.base_url, &temp_dir, Some("github_pat_abc"), TIMEOUT)
        .fetch()
        .await;
    assert_eq!(
        stub.last_authorization().as_deref(),
        Some("Bearer github_pat_abc")
    );

    let temp_dir = TempDir::new().unwrap();
    feed(&stub.base_url, &temp_dir, Some("ghp_classic"), TIMEOUT)
        .fetch()
        .await;
    assert_eq!(
        stub.last_authorization().as_deref(),
        Some("token ghp_classic")
    );
}
