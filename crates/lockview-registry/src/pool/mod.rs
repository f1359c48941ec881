//! Bounded concurrent fetching of registry metadata
//!
//! Workers pull names from one shared atomic cursor instead of owning fixed
//! slices, so a slow package never leaves other workers idle. A failed name
//! is dropped from the result and nothing else is affected.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use dashmap::DashMap;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

use lockview_core::types::PackageMetadata;
use crate::client::MetadataSource;

/// Default number of in-flight registry requests
pub const DEFAULT_CONCURRENCY: usize = 10;

/// Fixed-size worker pool over a [`MetadataSource`]
#[derive(Clone)]
pub struct FetchPool {
    source: Arc<dyn MetadataSource>,
    concurrency: usize,
}

impl FetchPool {
    /// Create a pool with the default concurrency ceiling
    pub fn new(source: Arc<dyn MetadataSource>) -> Self {
        Self {
            source,
            concurrency: DEFAULT_CONCURRENCY,
        }
    }

    /// Set the concurrency ceiling (at least one worker always runs)
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    /// Number of workers spawned for `jobs` names
    pub fn worker_count(&self, jobs: usize) -> usize {
        self.concurrency.min(jobs)
    }

    /// Fetch latest metadata for every name.
    ///
    /// `names` must already be unique. Returns only the names that succeeded;
    /// returns after every name has been attempted.
    pub async fn fetch_all(&self, names: &[String], registry_url: &str) -> HashMap<String, PackageMetadata> {
        let workers = self.worker_count(names.len());
        if workers == 0 {
            return HashMap::new();
        }

        let names: Arc<[String]> = names.into();
        let registry_url: Arc<str> = registry_url.into();
        let cursor = Arc::new(AtomicUsize::new(0));
        let results = Arc::new(DashMap::with_capacity(names.len()));

        debug!("Fetching {} packages with {} workers", names.len(), workers);

        let mut tasks = JoinSet::new();
        for worker in 0..workers {
            let source = Arc::clone(&self.source);
            let names = Arc::clone(&names);
            let registry_url = Arc::clone(&registry_url);
            let cursor = Arc::clone(&cursor);
            let results = Arc::clone(&results);

            tasks.spawn(async move {
                loop {
                    // Claim the next index; fetch_add hands each index out once
                    let index = cursor.fetch_add(1, Ordering::SeqCst);
                    let Some(name) = names.get(index) else {
                        break;
                    };

                    match source.fetch_latest(&registry_url, name).await {
                        Ok(metadata) => {
                            debug!(worker, "fetched {}@{}", name, metadata.version());
                            results.insert(name.clone(), metadata);
                        },
                        Err(e) => {
                            debug!(worker, "skipping {}: {}", name, e);
                        },
                    }
                }
            });
        }

        while let Some(joined) = tasks.join_next().await {
            if let Err(e) = joined {
                warn!("Registry fetch worker failed: {}", e);
            }
        }

        let fetched: HashMap<String, PackageMetadata> = match Arc::try_unwrap(results) {
            Ok(map) => map.into_iter().collect(),
            Err(shared) => shared
                .iter()
                .map(|entry| (entry.key().clone(), entry.value().clone()))
                .collect(),
        };

        info!("Fetched {}/{} packages from {}", fetched.len(), names.len(), registry_url);
        fetched
    }
}

impl std::fmt::Debug for FetchPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FetchPool")
            .field("concurrency", &self.concurrency)
            .finish_non_exhaustive()
    }
}
