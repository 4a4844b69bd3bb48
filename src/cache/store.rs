// Cache store for reading and writing cached data.
// Handles JSON serialization, TTL checking, and filesystem operations.
//
// Every storage step returns a Result internally so misses and store errors
// can be told apart in the logs; the public methods collapse both into a
// miss or a no-op so the cache never fails a request.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, SystemTime};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize, de::DeserializeOwned, de::IgnoredAny};
use tracing::{debug, warn};

use crate::error::{Result, ShowcaseError};

use super::paths::{TEMP_EXTENSION, entry_path, is_entry_file, is_temp_file, sanitize_key};

/// Default TTL for cached entries: 1 hour.
pub const DEFAULT_TTL: Duration = Duration::from_secs(60 * 60);

/// Temp files older than this are treated as orphans of a crashed writer.
const ORPHAN_TEMP_AGE: Duration = Duration::from_secs(60);

/// Disambiguates temp files of concurrent writers within one process.
static WRITE_SEQ: AtomicU64 = AtomicU64::new(0);

/// On-disk cache record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheEntry<T> {
    /// The cached data.
    pub data: T,
    /// When the entry was written.
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub timestamp: DateTime<Utc>,
    /// How long the entry stays fresh.
    #[serde(with = "duration_millis")]
    pub ttl: Duration,
    /// The unsanitized key the entry was stored under.
    pub key: String,
}

impl<T> CacheEntry<T> {
    /// Create a new entry stamped with the current time.
    pub fn new(key: impl Into<String>, data: T, ttl: Duration) -> Self {
        Self {
            data,
            timestamp: Utc::now(),
            ttl,
            key: key.into(),
        }
    }

    /// Time elapsed since the entry was written. Clock skew into the future
    /// counts as zero age.
    pub fn age_at(&self, now: DateTime<Utc>) -> Duration {
        now.signed_duration_since(self.timestamp)
            .to_std()
            .unwrap_or(Duration::ZERO)
    }

    /// An entry is expired once `now >= timestamp + ttl`.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.age_at(now) >= self.ttl
    }

    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }

    /// Describe this entry as seen at `now`.
    pub fn info_at(&self, now: DateTime<Utc>) -> CacheInfo {
        CacheInfo {
            exists: true,
            is_expired: Some(self.is_expired_at(now)),
            age: Some(self.age_at(now)),
            ttl: Some(self.ttl),
        }
    }
}

/// Introspection result for a single key.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheInfo {
    pub exists: bool,
    pub is_expired: Option<bool>,
    pub age: Option<Duration>,
    pub ttl: Option<Duration>,
}

impl CacheInfo {
    /// Info for a key with no readable entry.
    pub fn missing() -> Self {
        Self::default()
    }

    /// Whether the entry exists and is still fresh.
    pub fn is_fresh(&self) -> bool {
        self.exists && self.is_expired == Some(false)
    }

    /// Age rounded to whole minutes (0 when missing).
    pub fn age_minutes(&self) -> u64 {
        self.age.map(round_minutes).unwrap_or(0)
    }

    /// TTL rounded to whole minutes (0 when missing).
    pub fn ttl_minutes(&self) -> u64 {
        self.ttl.map(round_minutes).unwrap_or(0)
    }
}

fn round_minutes(duration: Duration) -> u64 {
    (duration.as_secs() + 30) / 60
}

/// Key/value store with one JSON file per key under a single directory.
#[derive(Debug, Clone)]
pub struct FileCache {
    directory: PathBuf,
    default_ttl: Duration,
}

impl FileCache {
    /// Create a store rooted at `directory`. The directory is created lazily
    /// on first write.
    pub fn new(directory: impl Into<PathBuf>, default_ttl: Duration) -> Self {
        Self {
            directory: directory.into(),
            default_ttl,
        }
    }

    /// A store for one consumer, rooted at a subdirectory of this one.
    pub fn namespace(&self, name: &str) -> Self {
        Self {
            directory: self.directory.join(sanitize_key(name)),
            default_ttl: self.default_ttl,
        }
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    pub fn default_ttl(&self) -> Duration {
        self.default_ttl
    }

    /// Read the value for `key`. Expired entries are deleted and reported as
    /// a miss; unreadable or unparsable entries are a miss.
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let path = entry_path(&self.directory, key);
        match read_entry::<T>(&path) {
            Ok(Some(entry)) if entry.is_expired() => {
                debug!(key, "cache entry expired");
                self.delete(key);
                None
            }
            Ok(Some(entry)) => {
                debug!(key, "cache hit");
                Some(entry.data)
            }
            Ok(None) => {
                debug!(key, "cache miss");
                None
            }
            Err(e) => {
                warn!(key, error = %e, "unreadable cache entry, treating as miss");
                None
            }
        }
    }

    /// Read the value for `key` whatever its age, without deleting it.
    pub fn peek<T: DeserializeOwned>(&self, key: &str) -> Option<(T, CacheInfo)> {
        let path = entry_path(&self.directory, key);
        match read_entry::<T>(&path) {
            Ok(Some(entry)) => {
                let info = entry.info_at(Utc::now());
                Some((entry.data, info))
            }
            Ok(None) => None,
            Err(e) => {
                warn!(key, error = %e, "unreadable cache entry, treating as miss");
                None
            }
        }
    }

    /// Store `value` under `key`, replacing any existing entry. Uses the
    /// default TTL when `ttl` is `None`. Write failures are logged only.
    pub fn set<T: Serialize>(&self, key: &str, value: &T, ttl: Option<Duration>) {
        let entry = CacheEntry::new(key, value, ttl.unwrap_or(self.default_ttl));
        if let Err(e) = self.write_entry(&entry) {
            warn!(key, error = %e, "failed to write cache entry");
        }
    }

    /// Remove the entry for `key` if there is one.
    pub fn delete(&self, key: &str) {
        let path = entry_path(&self.directory, key);
        if let Err(e) = remove_file(&path) {
            warn!(key, error = %e, "failed to delete cache entry");
        }
    }

    /// Whether `key` holds a fresh entry. Same expiry side effect as `get`.
    pub fn has(&self, key: &str) -> bool {
        self.get::<IgnoredAny>(key).is_some()
    }

    /// Remove every entry regardless of expiry. Returns the number of
    /// entries removed.
    pub fn clear(&self) -> usize {
        let paths = match self.list_files() {
            Ok(paths) => paths,
            Err(e) => {
                warn!(dir = %self.directory.display(), error = %e, "failed to clear cache");
                return 0;
            }
        };

        let mut removed = 0;
        for path in paths {
            let counts = is_entry_file(&path);
            if !counts && !is_temp_file(&path) {
                continue;
            }
            match remove_file(&path) {
                Ok(true) if counts => removed += 1,
                Ok(_) => {}
                Err(e) => warn!(path = %path.display(), error = %e, "failed to remove cache file"),
            }
        }

        debug!(removed, "cache cleared");
        removed
    }

    /// Inspect the entry for `key` without touching it.
    pub fn cache_info(&self, key: &str) -> CacheInfo {
        let path = entry_path(&self.directory, key);
        match read_entry::<IgnoredAny>(&path) {
            Ok(Some(entry)) => entry.info_at(Utc::now()),
            Ok(None) => CacheInfo::missing(),
            Err(e) => {
                debug!(key, error = %e, "cache info on unreadable entry");
                CacheInfo::missing()
            }
        }
    }

    /// Remove expired and malformed entries. Returns the number removed.
    ///
    /// Entries that vanish concurrently or fail with transient IO errors are
    /// skipped, not counted. Temp files left behind by crashed writers are
    /// removed too but not counted.
    pub fn cleanup(&self) -> usize {
        let paths = match self.list_files() {
            Ok(paths) => paths,
            Err(e) => {
                warn!(dir = %self.directory.display(), error = %e, "failed to clean up cache");
                return 0;
            }
        };

        let now = Utc::now();
        let mut removed = 0;

        for path in paths {
            if is_temp_file(&path) {
                if is_orphan_temp(&path) {
                    let _ = remove_file(&path);
                }
                continue;
            }
            if !is_entry_file(&path) {
                continue;
            }

            let stale = match read_entry::<IgnoredAny>(&path) {
                Ok(Some(entry)) => entry.is_expired_at(now),
                Ok(None) => false,
                Err(ShowcaseError::Json(e)) => {
                    debug!(path = %path.display(), error = %e, "removing malformed cache entry");
                    true
                }
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "skipping unreadable cache entry");
                    false
                }
            };

            if stale {
                match remove_file(&path) {
                    Ok(true) => removed += 1,
                    Ok(false) => {}
                    Err(e) => {
                        warn!(path = %path.display(), error = %e, "failed to remove cache entry")
                    }
                }
            }
        }

        debug!(removed, "cache cleanup finished");
        removed
    }

    /// Write an entry atomically via a temp file in the same directory.
    fn write_entry<T: Serialize>(&self, entry: &CacheEntry<T>) -> Result<()> {
        fs::create_dir_all(&self.directory)?;

        let path = entry_path(&self.directory, &entry.key);
        let json = serde_json::to_string_pretty(entry)?;

        let temp_path = self.directory.join(format!(
            "{}.{}.{}.{}",
            sanitize_key(&entry.key),
            std::process::id(),
            WRITE_SEQ.fetch_add(1, Ordering::Relaxed),
            TEMP_EXTENSION
        ));

        if let Err(e) = write_and_rename(&temp_path, &path, json.as_bytes()) {
            let _ = fs::remove_file(&temp_path);
            return Err(e.into());
        }
        Ok(())
    }

    /// Files directly inside the cache directory. A missing directory is empty.
    fn list_files(&self) -> Result<Vec<PathBuf>> {
        let entries = match fs::read_dir(&self.directory) {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut paths = Vec::new();
        for entry in entries {
            let entry = entry?;
            if entry.file_type()?.is_file() {
                paths.push(entry.path());
            }
        }
        Ok(paths)
    }
}

/// Read and parse an entry file. A missing file is `Ok(None)`.
fn read_entry<T: DeserializeOwned>(path: &Path) -> Result<Option<CacheEntry<T>>> {
    let contents = match fs::read(path) {
        Ok(contents) => contents,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e.into()),
    };

    let entry: CacheEntry<T> = serde_json::from_slice(&contents)?;
    Ok(Some(entry))
}

fn write_and_rename(temp_path: &Path, path: &Path, bytes: &[u8]) -> io::Result<()> {
    let mut file = fs::File::create(temp_path)?;
    file.write_all(bytes)?;
    file.sync_all()?;
    fs::rename(temp_path, path)
}

/// Delete a file. Returns whether this call removed it.
fn remove_file(path: &Path) -> Result<bool> {
    match fs::remove_file(path) {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(e.into()),
    }
}

fn is_orphan_temp(path: &Path) -> bool {
    fs::metadata(path)
        .and_then(|meta| meta.modified())
        .ok()
        .and_then(|modified| SystemTime::now().duration_since(modified).ok())
        .is_some_and(|age| age >= ORPHAN_TEMP_AGE)
}

/// Serde adapter storing a `Duration` as whole milliseconds.
mod duration_millis {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(ttl: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(u64::try_from(ttl.as_millis()).unwrap_or(u64::MAX))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}
