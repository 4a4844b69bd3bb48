// GitHub API endpoint functions.
// Provides typed methods for fetching data from the GitHub REST API.

use crate::error::Result;

use super::client::GitHubClient;
use super::types::{RateLimit, Repository};

/// Upper bound GitHub accepts for `per_page`.
pub const MAX_PER_PAGE: u32 = 100;

impl GitHubClient {
    /// Get public repositories owned by `username`, most recently updated first.
    pub async fn get_user_repos(
        &self,
        username: &str,
        per_page: u32,
    ) -> Result<(Vec<Repository>, RateLimit)> {
        let params = [
            ("sort", "updated"),
            ("direction", "desc"),
            ("per_page", &per_page.min(MAX_PER_PAGE).to_string()),
        ];
        let (response, rate_limit) = self
            .get_with_params(&format!("/users/{}/repos", username), &params)
            .await?;
        let repos: Vec<Repository> = response.json().await?;
        Ok((repos, rate_limit))
    }
}
