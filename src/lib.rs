// showcase: cached GitHub repository feed for a portfolio site.
// A TTL file cache in front of the GitHub repos API, exposed over HTTP and a CLI.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod github;
pub mod projects;

pub use cache::FileCache;
pub use config::Config;
pub use error::{Result, ShowcaseError};
pub use projects::{FeedResponse, FeedSource, ProjectFeed};
