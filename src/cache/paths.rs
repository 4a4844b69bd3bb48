// Cache path utilities.
// Maps cache keys to entry files and names the per-consumer namespaces.

use std::path::{Path, PathBuf};

use directories::ProjectDirs;

/// Namespace (subdirectory) holding GitHub repository entries.
pub const GITHUB_NAMESPACE: &str = "github";

/// File extension of a committed cache entry.
pub const ENTRY_EXTENSION: &str = "json";

/// File extension of an in-flight write.
pub const TEMP_EXTENSION: &str = "tmp";

/// Get the base cache directory (~/.cache/showcase on Linux).
/// Falls back to `./.cache` when no home directory can be resolved.
pub fn default_cache_dir() -> PathBuf {
    ProjectDirs::from("", "", "showcase")
        .map(|dirs| dirs.cache_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from(".cache"))
}

/// Cache key for an account's repository list.
pub fn repos_key(username: &str) -> String {
    format!("repos_{}", username)
}

/// Path of the entry file for `key` inside `dir`.
pub fn entry_path(dir: &Path, key: &str) -> PathBuf {
    dir.join(format!("{}.{}", sanitize_key(key), ENTRY_EXTENSION))
}

/// Whether a directory entry is a committed cache entry.
pub fn is_entry_file(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == ENTRY_EXTENSION)
}

/// Whether a directory entry is a leftover temp file from an interrupted write.
pub fn is_temp_file(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == TEMP_EXTENSION)
}

/// Sanitize a key for use as a file name.
/// Anything outside `[A-Za-z0-9_-]` becomes an underscore, so no key can
/// name a path outside the cache directory.
pub fn sanitize_key(key: &str) -> String {
    if key.is_empty() {
        return "_".to_string();
    }

    key.chars()
        .map(|c| match c {
            'a'..='z' | 'A'..='Z' | '0'..='9' | '-' | '_' => c,
            _ => '_',
        })
        .collect()
}
