//! Registry metadata engine for lockview
//!
//! This crate answers "what is the latest published version of each of these
//! packages" against an npm-compatible registry. Answers are cached on disk
//! with a TTL, misses are fetched by a bounded worker pool, and a package that
//! cannot be fetched is left out of the answer rather than failing the batch.

pub mod api;
pub mod cache;
pub mod client;
pub mod pool;
pub mod service;

// Re-export main types
pub use api::{encode_package_name, latest_url, DEFAULT_REGISTRY};
pub use cache::{is_expired, CacheBackend, CacheEntry, CacheStats, CacheStore, FileCache, MemoryCache, DEFAULT_TTL};
pub use client::{AuthConfig, MetadataSource, RegistryClient};
pub use pool::{FetchPool, DEFAULT_CONCURRENCY};
pub use service::{LatestVersions, MetadataService};

use lockview_core::error::LockviewError;

/// Result type for registry operations
pub type RegistryResult<T> = Result<T, LockviewError>;
