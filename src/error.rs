// Error types for showcase.
// Covers upstream GitHub failures, cache storage errors, and configuration problems.

use reqwest::StatusCode;
use thiserror::Error;

use crate::github::RateLimit;

#[derive(Error, Debug)]
pub enum ShowcaseError {
    #[error("GitHub API error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("GitHub API returned {status}: {message}")]
    Status {
        status: StatusCode,
        rate_limit: RateLimit,
        message: String,
    },

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, ShowcaseError>;
