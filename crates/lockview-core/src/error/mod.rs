//! Error types and result aliases for lockview operations.
//!
//! Per-package failures (one registry lookup, one dangling graph edge) are
//! absorbed where they happen and never reach this type. What remains here are
//! the failures that compromise a whole operation.

use thiserror::Error;

/// Unified error type for all lockview operations
#[derive(Error, Debug)]
pub enum LockviewError {
    // Project errors
    #[error("Failed to parse {file}: {message}")]
    JsonParse { file: String, message: String },

    #[error("No package.json found in {dir} or any parent directory")]
    ManifestNotFound { dir: String },

    #[error("Configuration field '{field}' is invalid: {reason}")]
    ConfigValidation { field: String, reason: String },

    #[error("Failed to parse configuration file: {message}")]
    TomlParse { message: String },

    // Registry errors
    #[error("Package '{name}' not found in registry")]
    PackageNotFound { name: String },

    #[error("Registry returned invalid metadata for '{name}': {reason}")]
    InvalidMetadata { name: String, reason: String },

    #[error("Network error: {message}")]
    Network {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    // Cache errors
    #[error("Failed to persist registry cache to {path}: {message}")]
    CachePersist {
        path: String,
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    // IO errors
    #[error("IO error: {message}")]
    Io {
        message: String,
        #[source]
        source: std::io::Error,
    },
}

/// Result type alias for lockview operations
pub type LockviewResult<T> = Result<T, LockviewError>;

impl LockviewError {
    /// Create a network error from any error type
    pub fn network<E>(message: String, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Network {
            message,
            source: Some(Box::new(source)),
        }
    }

    /// Create an IO error from std::io::Error
    pub fn io(message: String, source: std::io::Error) -> Self {
        Self::Io { message, source }
    }

    /// Create a cache persistence error
    pub fn cache_persist<E>(path: impl Into<String>, message: String, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::CachePersist {
            path: path.into(),
            message,
            source: Some(Box::new(source)),
        }
    }

    /// Check if this error is recoverable by retrying
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            LockviewError::Network { .. } | LockviewError::Io { .. } | LockviewError::CachePersist { .. }
        )
    }

    /// Get a user-friendly suggestion for fixing this error
    pub fn suggestion(&self) -> Option<&'static str> {
        match self {
            LockviewError::ManifestNotFound { .. } => {
                Some("Run lockview inside an npm project or pass --dir <path>")
            },
            LockviewError::PackageNotFound { .. } => {
                Some("Check the package name spelling or try searching the registry")
            },
            LockviewError::Network { .. } => Some("Check your internet connection and try again"),
            LockviewError::CachePersist { .. } => {
                Some("Check that the cache directory is writable or pass --cache-file")
            },
            LockviewError::ConfigValidation { .. } | LockviewError::TomlParse { .. } => {
                Some("Fix ~/.lockview/config.toml or the LOCKVIEW_* environment variables")
            },
            _ => None,
        }
    }
}
