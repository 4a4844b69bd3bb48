// Projects module.
// Builds the portfolio's project list from GitHub through the file cache.

pub mod feed;
pub mod transform;

pub use feed::{FeedResponse, FeedSource, Performance, ProjectFeed};
pub use transform::{Project, ProjectLinks, select_projects};
