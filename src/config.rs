// Runtime configuration.
// Resolves the GitHub account, credentials, cache location, and server address from the environment.

use std::path::PathBuf;
use std::time::Duration;

use crate::cache::{DEFAULT_TTL, default_cache_dir};
use crate::error::{Result, ShowcaseError};
use crate::github::{DEFAULT_TIMEOUT, GITHUB_API_BASE};

pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 3000;

#[derive(Debug, Clone)]
pub struct Config {
    /// GitHub account whose repositories make up the feed.
    pub username: String,
    /// Personal access token; unauthenticated requests get a lower rate limit.
    pub token: Option<String>,
    pub api_base: String,
    /// Cache root; repository entries live in its `github` namespace.
    pub cache_dir: PathBuf,
    pub cache_ttl: Duration,
    /// Bound on each upstream request.
    pub request_timeout: Duration,
    pub host: String,
    pub port: u16,
}

impl Config {
    /// Configuration for `username` with every other setting at its default.
    pub fn new(username: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            token: None,
            api_base: GITHUB_API_BASE.to_string(),
            cache_dir: default_cache_dir(),
            cache_ttl: DEFAULT_TTL,
            request_timeout: DEFAULT_TIMEOUT,
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
        }
    }

    /// Load from environment variables.
    ///
    /// `GITHUB_USERNAME` is required. Optional: `GITHUB_TOKEN`,
    /// `GITHUB_API_URL`, `SHOWCASE_CACHE_DIR`, `SHOWCASE_CACHE_TTL_SECS`,
    /// `SHOWCASE_TIMEOUT_MS`, `SHOWCASE_HOST`, `SHOWCASE_PORT`.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load from an arbitrary variable source. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let username = var("GITHUB_USERNAME")
            .ok_or_else(|| ShowcaseError::Config("GITHUB_USERNAME is not set".to_string()))?;
        let username = username.trim();
        validate_username(username)?;
        let mut config = Self::new(username);

        config.token = var("GITHUB_TOKEN");
        if let Some(api_base) = var("GITHUB_API_URL") {
            config.api_base = api_base;
        }
        if let Some(dir) = var("SHOWCASE_CACHE_DIR") {
            config.cache_dir = PathBuf::from(dir);
        }
        if let Some(secs) = var("SHOWCASE_CACHE_TTL_SECS") {
            config.cache_ttl = Duration::from_secs(parse_number("SHOWCASE_CACHE_TTL_SECS", &secs)?);
        }
        if let Some(ms) = var("SHOWCASE_TIMEOUT_MS") {
            config.request_timeout = Duration::from_millis(parse_number("SHOWCASE_TIMEOUT_MS", &ms)?);
        }
        if let Some(host) = var("SHOWCASE_HOST") {
            config.host = host;
        }
        if let Some(port) = var("SHOWCASE_PORT") {
            config.port = port
                .trim()
                .parse()
                .map_err(|_| ShowcaseError::Config(format!("SHOWCASE_PORT is not a port: {}", port)))?;
        }

        Ok(config)
    }
}

/// Longest login GitHub allows.
const MAX_USERNAME_LEN: usize = 39;

/// GitHub logins are ASCII alphanumerics and inner hyphens. The name is
/// placed in the request path unencoded, so anything else is refused.
pub fn validate_username(username: &str) -> Result<()> {
    let valid = !username.is_empty()
        && username.len() <= MAX_USERNAME_LEN
        && !username.starts_with('-')
        && !username.ends_with('-')
        && username.chars().all(|c| c.is_ascii_alphanumeric() || c == '-');

    if valid {
        Ok(())
    } else {
        Err(ShowcaseError::Config(format!(
            "GITHUB_USERNAME is not a valid GitHub login: {}",
            username
        )))
    }
}

fn parse_number(name: &str, value: &str) -> Result<u64> {
    value
        .trim()
        .parse()
        .map_err(|_| ShowcaseError::Config(format!("{} is not a number: {}", name, value)))
}
