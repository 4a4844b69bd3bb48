// Read-through project feed.
// Serves the project list from the cache when fresh, refreshes it from GitHub
// otherwise, and falls back to stale cache data when GitHub is unavailable.

use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::cache::{CacheInfo, FileCache, GITHUB_NAMESPACE, repos_key};
use crate::config::Config;
use crate::error::Result;
use crate::github::endpoints::MAX_PER_PAGE;
use crate::github::{FetchFailure, GitHubClient, RateLimit};

use super::transform::{Project, select_projects};

/// Where a feed response came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FeedSource {
    #[serde(rename = "github-api")]
    Live,
    #[serde(rename = "cache")]
    Cache,
    #[serde(rename = "stale-cache")]
    StaleCache,
    #[serde(rename = "error")]
    Error,
}

impl FeedSource {
    pub fn as_str(self) -> &'static str {
        match self {
            FeedSource::Live => "github-api",
            FeedSource::Cache => "cache",
            FeedSource::StaleCache => "stale-cache",
            FeedSource::Error => "error",
        }
    }
}

/// Timing and cache details of a served request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Performance {
    pub duration_ms: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cache_age_ms: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cache_ttl_ms: Option<u64>,
}

/// Response body of the project feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedResponse {
    pub projects: Vec<Project>,
    /// When the projects were fetched from GitHub.
    pub last_updated: DateTime<Utc>,
    pub source: FeedSource,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rate_limit: Option<RateLimit>,
    pub performance: Performance,
    /// Set when the response carries no data.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<FetchFailure>,
    /// Set when stale data is served because GitHub failed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub warning: Option<FetchFailure>,
}

impl FeedResponse {
    /// 200 whenever projects are served; 429 or 503 otherwise.
    pub fn http_status(&self) -> StatusCode {
        match &self.error {
            Some(failure) => failure.http_status(),
            None => StatusCode::OK,
        }
    }
}

/// Project list for one GitHub account, cached on disk.
#[derive(Debug, Clone)]
pub struct ProjectFeed {
    client: GitHubClient,
    cache: FileCache,
    username: String,
}

impl ProjectFeed {
    /// `cache` should already be the namespace reserved for repository data.
    pub fn new(client: GitHubClient, cache: FileCache, username: impl Into<String>) -> Self {
        Self {
            client,
            cache,
            username: username.into(),
        }
    }

    /// Build the client and the `github` cache namespace from configuration.
    pub fn from_config(config: &Config) -> Result<Self> {
        let client = GitHubClient::new(
            &config.api_base,
            config.token.as_deref(),
            config.request_timeout,
        )?;
        let cache = FileCache::new(&config.cache_dir, config.cache_ttl).namespace(GITHUB_NAMESPACE);
        Ok(Self::new(client, cache, &config.username))
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn cache(&self) -> &FileCache {
        &self.cache
    }

    pub fn cache_key(&self) -> String {
        repos_key(&self.username)
    }

    /// Inspect the cached project list without touching it.
    pub fn cache_info(&self) -> CacheInfo {
        self.cache.cache_info(&self.cache_key())
    }

    /// Serve the project list, preferring fresh cache, then GitHub, then
    /// stale cache. Never fails; errors are reported in the response.
    pub async fn fetch(&self) -> FeedResponse {
        let started = Instant::now();
        let key = self.cache_key();

        let cached = self.cache.peek::<Vec<Project>>(&key);
        if let Some((projects, cache_info)) = &cached {
            if cache_info.is_fresh() {
                let response = from_cache(projects.clone(), cache_info, FeedSource::Cache, started);
                log_served(&response);
                return response;
            }
        }

        let response = match self.fetch_live().await {
            Ok((projects, rate_limit)) => {
                self.cache.set(&key, &projects, None);
                FeedResponse {
                    projects,
                    last_updated: Utc::now(),
                    source: FeedSource::Live,
                    rate_limit: Some(rate_limit),
                    performance: Performance {
                        duration_ms: elapsed_ms(started),
                        ..Performance::default()
                    },
                    error: None,
                    warning: None,
                }
            }
            Err(e) => {
                let failure = FetchFailure::classify(&e);
                warn!(
                    username = %self.username,
                    kind = failure.kind.as_str(),
                    can_retry = failure.can_retry,
                    error = %e,
                    "failed to fetch repositories from GitHub"
                );

                match cached {
                    Some((projects, cache_info)) => {
                        let mut response =
                            from_cache(projects, &cache_info, FeedSource::StaleCache, started);
                        response.warning = Some(failure);
                        response
                    }
                    None => FeedResponse {
                        projects: Vec::new(),
                        last_updated: Utc::now(),
                        source: FeedSource::Error,
                        rate_limit: None,
                        performance: Performance {
                            duration_ms: elapsed_ms(started),
                            ..Performance::default()
                        },
                        error: Some(failure),
                        warning: None,
                    },
                }
            }
        };

        log_served(&response);
        response
    }

    async fn fetch_live(&self) -> Result<(Vec<Project>, RateLimit)> {
        let (repos, rate_limit) = self
            .client
            .get_user_repos(&self.username, MAX_PER_PAGE)
            .await?;
        Ok((select_projects(repos), rate_limit))
    }
}

fn from_cache(
    projects: Vec<Project>,
    cache_info: &CacheInfo,
    source: FeedSource,
    started: Instant,
) -> FeedResponse {
    let age = cache_info.age.unwrap_or_default();
    let last_updated = chrono::Duration::from_std(age)
        .ok()
        .and_then(|age| Utc::now().checked_sub_signed(age))
        .unwrap_or_else(Utc::now);

    FeedResponse {
        projects,
        last_updated,
        source,
        rate_limit: None,
        performance: Performance {
            duration_ms: elapsed_ms(started),
            cache_age_ms: Some(millis(age)),
            cache_ttl_ms: cache_info.ttl.map(millis),
        },
        error: None,
        warning: None,
    }
}

fn log_served(response: &FeedResponse) {
    info!(
        source = response.source.as_str(),
        projects = response.projects.len(),
        duration_ms = response.performance.duration_ms,
        status = response.http_status().as_u16(),
        "served project feed"
    );
}

fn elapsed_ms(started: Instant) -> u64 {
    millis(started.elapsed())
}

fn millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}
