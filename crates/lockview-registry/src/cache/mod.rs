//! Registry metadata cache with TTL support
//!
//! The cache is a plain name → entry map that lives in memory for the
//! duration of one service call. Durability is the job of a [`CacheBackend`]:
//! the file backend keeps a single JSON document shaped
//! `{ "<name>": { "data": {...}, "cachedAt": <ms> } }`.

use std::time::Duration;

use async_trait::async_trait;
use camino::{Utf8Path, Utf8PathBuf};
use chrono::Utc;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::{debug, warn};

use lockview_core::error::LockviewError;
use lockview_core::types::PackageMetadata;
use crate::RegistryResult;

/// Default freshness window (12 hours)
pub const DEFAULT_TTL: Duration = Duration::from_secs(12 * 60 * 60);

/// Milliseconds since the Unix epoch
pub type Timestamp = i64;

/// Current time as a cache timestamp
pub fn now_millis() -> Timestamp {
    Utc::now().timestamp_millis()
}

/// One cached registry response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry {
    /// Metadata exactly as the registry returned it
    pub data: PackageMetadata,
    /// When the entry was stored
    #[serde(rename = "cachedAt", deserialize_with = "deserialize_timestamp")]
    pub cached_at: Timestamp,
}

impl CacheEntry {
    /// Create an entry stamped with the given time
    pub fn new(data: PackageMetadata, cached_at: Timestamp) -> Self {
        Self { data, cached_at }
    }

    /// Age of the entry at `now`, `None` if it is dated in the future or
    /// too far in the past to measure
    pub fn age(&self, now: Timestamp) -> Option<Duration> {
        now.checked_sub(self.cached_at)
            .and_then(|elapsed| u64::try_from(elapsed).ok())
            .map(Duration::from_millis)
    }
}

/// Accept any JSON number; fractional milliseconds are truncated
fn deserialize_timestamp<'de, D>(deserializer: D) -> Result<Timestamp, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let number = serde_json::Number::deserialize(deserializer)?;
    match number.as_i64() {
        Some(millis) => Ok(millis),
        None => number
            .as_f64()
            .filter(|millis| millis.is_finite())
            .map(|millis| millis as Timestamp)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid cachedAt timestamp: {}", number))),
    }
}

/// Whether `entry` is older than `ttl` at `now`
///
/// An entry whose age cannot be measured (dated after `now`, or a timestamp
/// out of range in a hand-edited file) is treated as expired.
pub fn is_expired(entry: &CacheEntry, now: Timestamp, ttl: Duration) -> bool {
    match entry.age(now) {
        Some(age) => age > ttl,
        None => true,
    }
}

/// In-memory view of the whole cache
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CacheStore {
    entries: IndexMap<String, CacheEntry>,
}

impl CacheStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the entry for a package, fresh or not
    pub fn get(&self, name: &str) -> Option<&CacheEntry> {
        self.entries.get(name)
    }

    /// Get cached metadata if still fresh at `now`
    pub fn get_fresh(&self, name: &str, now: Timestamp, ttl: Duration) -> Option<&PackageMetadata> {
        self.entries
            .get(name)
            .filter(|entry| !is_expired(entry, now, ttl))
            .map(|entry| &entry.data)
    }

    /// Insert or replace a whole entry
    pub fn insert(&mut self, name: String, entry: CacheEntry) {
        self.entries.insert(name, entry);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over all entries in storage order
    pub fn iter(&self) -> impl Iterator<Item = (&String, &CacheEntry)> {
        self.entries.iter()
    }

    /// Get cache statistics at `now`
    pub fn stats(&self, now: Timestamp, ttl: Duration) -> CacheStats {
        let stale_entries = self
            .entries
            .values()
            .filter(|entry| is_expired(entry, now, ttl))
            .count();

        CacheStats {
            total_entries: self.entries.len(),
            fresh_entries: self.entries.len() - stale_entries,
            stale_entries,
        }
    }

    /// Remove stale entries
    pub fn prune(&mut self, now: Timestamp, ttl: Duration) -> usize {
        let before = self.entries.len();
        self.entries.retain(|_, entry| !is_expired(entry, now, ttl));
        before - self.entries.len()
    }

    /// Clear all cached entries
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

/// Cache statistics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheStats {
    /// Total number of entries
    pub total_entries: usize,
    /// Number of fresh entries
    pub fresh_entries: usize,
    /// Number of stale entries
    pub stale_entries: usize,
}

/// Durable storage for a [`CacheStore`]
#[async_trait]
pub trait CacheBackend: Send + Sync {
    /// Read the stored cache. Never fails: anything unreadable is a cold cache.
    async fn load(&self) -> CacheStore;

    /// Overwrite the stored cache with `store`
    async fn save(&self, store: &CacheStore) -> RegistryResult<()>;
}

/// Cache persisted as one compact JSON file
#[derive(Debug, Clone)]
pub struct FileCache {
    path: Utf8PathBuf,
}

impl FileCache {
    /// File name used inside the application data directory
    pub const FILE_NAME: &'static str = "registry-cache.json";

    pub fn new<P: AsRef<Utf8Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Utf8Path {
        &self.path
    }

    fn temp_path(&self) -> Utf8PathBuf {
        let file_name = self.path.file_name().unwrap_or(Self::FILE_NAME);
        self.path.with_file_name(format!(".{}.tmp", file_name))
    }
}

#[async_trait]
impl CacheBackend for FileCache {
    async fn load(&self) -> CacheStore {
        let content = match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("No registry cache at {}, starting cold", self.path);
                return CacheStore::new();
            },
            Err(e) => {
                warn!("Cannot read registry cache {}: {}", self.path, e);
                return CacheStore::new();
            },
        };

        match serde_json::from_str::<CacheStore>(&content) {
            Ok(store) => {
                debug!("Loaded {} cached packages from {}", store.len(), self.path);
                store
            },
            Err(e) => {
                warn!("Ignoring corrupt registry cache {}: {}", self.path, e);
                CacheStore::new()
            },
        }
    }

    async fn save(&self, store: &CacheStore) -> RegistryResult<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await.map_err(|e| {
                LockviewError::cache_persist(
                    self.path.as_str(),
                    "Failed to create cache directory".to_string(),
                    e,
                )
            })?;
        }

        let bytes = serde_json::to_vec(store).map_err(|e| {
            LockviewError::cache_persist(self.path.as_str(), "Failed to serialize cache".to_string(), e)
        })?;

        // Write next to the target and rename so readers never see half a file
        let temp_path = self.temp_path();
        tokio::fs::write(&temp_path, &bytes).await.map_err(|e| {
            LockviewError::cache_persist(self.path.as_str(), "Failed to write cache file".to_string(), e)
        })?;
        tokio::fs::rename(&temp_path, &self.path).await.map_err(|e| {
            LockviewError::cache_persist(self.path.as_str(), "Failed to replace cache file".to_string(), e)
        })?;

        debug!("Saved {} cached packages to {}", store.len(), self.path);
        Ok(())
    }
}

/// Cache that never leaves memory
#[derive(Debug, Default)]
pub struct MemoryCache {
    store: Mutex<CacheStore>,
    saves: std::sync::atomic::AtomicUsize,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from an existing store
    pub fn with_store(store: CacheStore) -> Self {
        Self {
            store: Mutex::new(store),
            saves: Default::default(),
        }
    }

    /// Snapshot of the last saved store
    pub async fn snapshot(&self) -> CacheStore {
        self.store.lock().await.clone()
    }

    /// Number of completed saves
    pub fn save_count(&self) -> usize {
        self.saves.load(std::sync::atomic::Ordering::SeqCst)
    }
}

#[async_trait]
impl CacheBackend for MemoryCache {
    async fn load(&self) -> CacheStore {
        self.store.lock().await.clone()
    }

    async fn save(&self, store: &CacheStore) -> RegistryResult<()> {
        *self.store.lock().await = store.clone();
        self.saves.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        Ok(())
    }
}
