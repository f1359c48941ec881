//! Command implementations and dispatch logic.
//!
//! Each command module exposes a `collect` step that produces data and an
//! `execute` step that prints it, as text or as JSON.

use std::path::PathBuf;
use std::sync::Arc;

use camino::{Utf8Path, Utf8PathBuf};
use tracing::info;

use lockview_config::{collect_env_overrides, ManifestLoader, Settings, SettingsLayer, SettingsLoader};
use lockview_core::error::{LockviewError, LockviewResult};
use lockview_registry::{AuthConfig, FetchPool, FileCache, MetadataService, RegistryClient};

pub mod cache;
pub mod latest;
pub mod outdated;
pub mod tree;

#[cfg(test)]
mod tests;

use crate::output::OutputHandler;
use crate::Commands;

/// Shared context for all commands
pub struct CommandContext {
    pub cwd: Utf8PathBuf,
    pub settings: Settings,
    pub json: bool,
    pub output: OutputHandler,
}

impl CommandContext {
    /// Create a new command context
    pub async fn new(dir: Option<PathBuf>, overrides: SettingsLayer, json: bool) -> LockviewResult<Self> {
        let cwd = match dir {
            Some(dir) => dir,
            None => std::env::current_dir()
                .map_err(|e| LockviewError::io("Failed to get current directory".to_string(), e))?,
        };
        let cwd = Utf8PathBuf::from_path_buf(cwd).map_err(|path| LockviewError::ConfigValidation {
            field: "dir".to_string(),
            reason: format!("{} is not valid UTF-8", path.display()),
        })?;

        let settings = SettingsLoader::new().load(&collect_env_overrides(), overrides).await?;
        let output = if json { OutputHandler::plain() } else { OutputHandler::new() };

        Ok(Self {
            cwd,
            settings,
            json,
            output,
        })
    }

    /// Registry service wired from the resolved settings
    pub fn metadata_service(&self) -> LockviewResult<MetadataService> {
        let client = RegistryClient::with_auth(AuthConfig {
            token: self.settings.registry_token.clone(),
        })?;
        let pool = FetchPool::new(Arc::new(client)).with_concurrency(self.settings.concurrency);
        let backend = Arc::new(FileCache::new(&self.settings.cache_file));

        Ok(MetadataService::new(backend, pool).with_ttl(self.settings.cache_ttl()))
    }

    /// Directory of the enclosing project, or the working directory outside one
    pub fn project_dir(&self) -> Utf8PathBuf {
        ManifestLoader::new(&self.cwd)
            .resolve_manifest_path()
            .ok()
            .and_then(|manifest| manifest.parent().map(Utf8Path::to_path_buf))
            .unwrap_or_else(|| self.cwd.clone())
    }
}

/// Dispatch a command to its handler
pub async fn dispatch_command(command: Commands, ctx: &CommandContext) -> LockviewResult<()> {
    match command {
        Commands::Latest { packages } => {
            info!("Looking up {} packages", packages.len());
            latest::execute(&packages, ctx).await
        },
        Commands::Outdated { all } => {
            info!("Checking for outdated dependencies (all: {})", all);
            outdated::execute(all, ctx).await
        },
        Commands::Tree { depth } => {
            info!("Rendering dependency tree (depth: {:?})", depth);
            tree::execute(depth, ctx).await
        },
        Commands::Cache { action } => {
            info!("Cache {:?}", action);
            cache::execute(action, ctx).await
        },
    }
}
