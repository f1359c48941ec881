//! Registry metadata service
//!
//! Serves latest-version metadata from the TTL cache, fetches only what is
//! missing or expired, and persists the merged cache once per call.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use indexmap::IndexSet;
use tokio::sync::Mutex;
use tracing::{debug, info};

use lockview_core::types::PackageMetadata;
use crate::cache::{now_millis, CacheBackend, CacheEntry, CacheStats, Timestamp, DEFAULT_TTL};
use crate::pool::FetchPool;
use crate::RegistryResult;

/// Latest metadata keyed by package name
pub type LatestVersions = BTreeMap<String, PackageMetadata>;

/// Cache-backed registry lookups
pub struct MetadataService {
    backend: Arc<dyn CacheBackend>,
    pool: FetchPool,
    ttl: Duration,
    /// Serializes load → mutate → save across concurrent callers
    lock: Mutex<()>,
}

impl MetadataService {
    /// Create a service with the default 12 hour TTL
    pub fn new(backend: Arc<dyn CacheBackend>, pool: FetchPool) -> Self {
        Self {
            backend,
            pool,
            ttl: DEFAULT_TTL,
            lock: Mutex::new(()),
        }
    }

    /// Override the cache TTL
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Latest metadata for each name that is cached or fetchable.
    ///
    /// Names whose lookup fails are simply absent from the map. The only
    /// error is a failure to persist the updated cache.
    pub async fn get_latest_versions<I, S>(&self, names: I, registry_url: &str) -> RegistryResult<LatestVersions>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.get_latest_versions_at(names, registry_url, now_millis()).await
    }

    /// [`get_latest_versions`](Self::get_latest_versions) with an explicit clock
    pub async fn get_latest_versions_at<I, S>(
        &self,
        names: I,
        registry_url: &str,
        now: Timestamp,
    ) -> RegistryResult<LatestVersions>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let requested: IndexSet<String> = names
            .into_iter()
            .map(|name| name.as_ref().to_string())
            .collect();

        let _guard = self.lock.lock().await;
        let mut store = self.backend.load().await;

        // Partition into fresh hits and names that need the network
        let mut result = LatestVersions::new();
        let mut uncached = Vec::new();
        for name in requested {
            match store.get_fresh(&name, now, self.ttl) {
                Some(metadata) => {
                    result.insert(name, metadata.clone());
                },
                None => uncached.push(name),
            }
        }

        if uncached.is_empty() {
            debug!("All {} packages served from cache", result.len());
            return Ok(result);
        }

        info!("{} packages cached, fetching {} from {}", result.len(), uncached.len(), registry_url);
        let fetched = self.pool.fetch_all(&uncached, registry_url).await;

        if fetched.is_empty() {
            debug!("Nothing fetched, leaving cache untouched");
            return Ok(result);
        }

        for (name, metadata) in fetched {
            store.insert(name.clone(), CacheEntry::new(metadata.clone(), now));
            result.insert(name, metadata);
        }

        self.backend.save(&store).await?;
        Ok(result)
    }

    /// Freshness counts for the persisted cache
    pub async fn cache_stats(&self) -> CacheStats {
        let _guard = self.lock.lock().await;
        self.backend.load().await.stats(now_millis(), self.ttl)
    }

    /// Drop expired entries from the persisted cache
    pub async fn prune_cache(&self) -> RegistryResult<usize> {
        let _guard = self.lock.lock().await;
        let mut store = self.backend.load().await;

        let removed = store.prune(now_millis(), self.ttl);
        if removed > 0 {
            self.backend.save(&store).await?;
        }
        Ok(removed)
    }

    /// Empty the persisted cache
    pub async fn clear_cache(&self) -> RegistryResult<usize> {
        let _guard = self.lock.lock().await;
        let mut store = self.backend.load().await;

        let removed = store.len();
        store.clear();
        self.backend.save(&store).await?;
        Ok(removed)
    }
}
