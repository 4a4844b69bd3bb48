// GitHub API module.
// Provides the client, response types, and failure classification for the REST API.

pub mod client;
pub mod endpoints;
pub mod failure;
pub mod types;

pub use client::{DEFAULT_TIMEOUT, GITHUB_API_BASE, GitHubClient};
pub use failure::{FailureKind, FetchFailure};
pub use types::{RateLimit, Repository};
