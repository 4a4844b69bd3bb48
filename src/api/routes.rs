// HTTP route handlers.
// Feed, health, and cache maintenance endpoints sharing one ProjectFeed.

use std::sync::Arc;

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use serde::{Deserialize, Serialize};

use crate::cache::CacheInfo;
use crate::projects::ProjectFeed;

/// Application state
pub struct AppState {
    pub feed: ProjectFeed,
}

/// Health check response
#[derive(Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

/// Cache introspection response
#[derive(Debug, Serialize, Deserialize)]
pub struct CacheInfoResponse {
    pub success: bool,
    pub cache: CacheStatus,
}

/// Cache entry details, durations in milliseconds
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheStatus {
    pub exists: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_expired: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub age: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ttl: Option<u64>,
    pub age_minutes: u64,
    pub ttl_minutes: u64,
}

impl From<CacheInfo> for CacheStatus {
    fn from(info: CacheInfo) -> Self {
        let millis = |d: std::time::Duration| u64::try_from(d.as_millis()).unwrap_or(u64::MAX);
        Self {
            exists: info.exists,
            is_expired: info.is_expired,
            age: info.age.map(millis),
            ttl: info.ttl.map(millis),
            age_minutes: info.age_minutes(),
            ttl_minutes: info.ttl_minutes(),
        }
    }
}

/// Result of a clear or cleanup
#[derive(Debug, Serialize, Deserialize)]
pub struct CacheActionResponse {
    pub success: bool,
    pub message: String,
    pub removed: usize,
}

/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Project feed endpoint
pub async fn github_repos(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let response = state.feed.fetch().await;
    (response.http_status(), Json(response))
}

/// Cache details for the configured account's repository list
pub async fn cache_info(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(CacheInfoResponse {
        success: true,
        cache: state.feed.cache_info().into(),
    })
}

/// Remove every repository cache entry
pub async fn clear_cache(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let removed = state.feed.cache().clear();
    (
        StatusCode::OK,
        Json(CacheActionResponse {
            success: true,
            message: format!("Cache cleared successfully. Removed {} entries.", removed),
            removed,
        }),
    )
}

/// Remove expired and malformed repository cache entries
pub async fn cleanup_cache(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let removed = state.feed.cache().cleanup();
    (
        StatusCode::OK,
        Json(CacheActionResponse {
            success: true,
            message: format!("Cache cleanup completed. Cleaned {} expired entries.", removed),
            removed,
        }),
    )
}
