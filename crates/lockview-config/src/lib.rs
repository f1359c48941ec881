//! Configuration for lockview
//!
//! This crate reads the project's package.json and resolves the tool's own
//! settings from defaults, the global config file, the environment and the
//! command line.

pub mod manifest;
pub mod settings;

// Re-export main types
pub use manifest::{ManifestLoader, PackageJson, Project, MANIFEST_FILE};
pub use settings::{
    collect_env_overrides, merge_settings, validate_settings, Settings, SettingsLayer, SettingsLoader,
};

use lockview_core::error::LockviewError;

/// Result type for configuration operations
pub type ConfigResult<T> = Result<T, LockviewError>;
