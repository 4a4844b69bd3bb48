// Cache module for local filesystem caching.
// Stores upstream API responses as TTL-stamped JSON files, one file per key.

pub mod paths;
pub mod store;

pub use paths::{GITHUB_NAMESPACE, default_cache_dir, repos_key, sanitize_key};
pub use store::{CacheEntry, CacheInfo, DEFAULT_TTL, FileCache};
