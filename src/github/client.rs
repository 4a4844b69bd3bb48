// GitHub API HTTP client.
// Handles authentication, request timeouts, and response status checking.

use std::time::Duration;

use reqwest::{
    Client, Response,
    header::{ACCEPT, AUTHORIZATION, HeaderMap, HeaderValue, USER_AGENT},
};

use crate::error::{Result, ShowcaseError};

use super::types::RateLimit;

pub const GITHUB_API_BASE: &str = "https://api.github.com";

/// Prefix of fine-grained personal access tokens, which require `Bearer` auth.
const FINE_GRAINED_PREFIX: &str = "github_pat_";

/// Default bound on a single upstream request.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// GitHub API client with optional authentication.
#[derive(Debug, Clone)]
pub struct GitHubClient {
    client: Client,
    base_url: String,
}

impl GitHubClient {
    /// Create a client against `base_url`. Every request is aborted after
    /// `timeout`.
    pub fn new(base_url: &str, token: Option<&str>, timeout: Duration) -> Result<Self> {
        let mut headers = HeaderMap::new();

        if let Some(token) = token.filter(|t| !t.is_empty()) {
            headers.insert(
                AUTHORIZATION,
                HeaderValue::from_str(&authorization_value(token))
                    .map_err(|e| ShowcaseError::Config(format!("invalid GitHub token: {}", e)))?,
            );
        }
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("application/vnd.github.v3+json"),
        );
        headers.insert(
            USER_AGENT,
            HeaderValue::from_static(concat!("showcase/", env!("CARGO_PKG_VERSION"))),
        );

        let client = Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Make a GET request with query parameters.
    pub async fn get_with_params<T: serde::Serialize + ?Sized>(
        &self,
        endpoint: &str,
        params: &T,
    ) -> Result<(Response, RateLimit)> {
        let url = format!("{}{}", self.base_url, endpoint);
        let response = self.client.get(&url).query(params).send().await?;

        let rate_limit = RateLimit::from_headers(response.headers());
        let response = check_response(response, &rate_limit).await?;
        Ok((response, rate_limit))
    }
}

/// Fine-grained tokens use `Bearer`, classic tokens the `token` scheme.
pub fn authorization_value(token: &str) -> String {
    if token.starts_with(FINE_GRAINED_PREFIX) {
        format!("Bearer {}", token)
    } else {
        format!("token {}", token)
    }
}

/// Turn non-success statuses into `ShowcaseError::Status`.
async fn check_response(response: Response, rate_limit: &RateLimit) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let message = response.text().await.unwrap_or_default();
    Err(ShowcaseError::Status {
        status,
        rate_limit: rate_limit.clone(),
        message: api_message(&message),
    })
}

/// Extract GitHub's `message` field from an error body, falling back to the raw text.
fn api_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v.get("message").and_then(|m| m.as_str()).map(str::to_string))
        .unwrap_or_else(|| body.trim().to_string())
}
