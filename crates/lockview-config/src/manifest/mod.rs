//! package.json reading and project discovery

use camino::{Utf8Path, Utf8PathBuf};
use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};

use lockview_core::error::LockviewError;
use lockview_core::types::DependencyKind;
use crate::ConfigResult;

/// Manifest file name
pub const MANIFEST_FILE: &str = "package.json";

/// The parts of package.json lockview reads
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PackageJson {
    /// Package name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Package version
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,

    /// Runtime dependencies
    #[serde(default)]
    pub dependencies: IndexMap<String, String>,

    /// Development dependencies
    #[serde(default, rename = "devDependencies")]
    pub dev_dependencies: IndexMap<String, String>,

    /// Peer dependencies
    #[serde(default, rename = "peerDependencies")]
    pub peer_dependencies: IndexMap<String, String>,

    /// Optional dependencies
    #[serde(default, rename = "optionalDependencies")]
    pub optional_dependencies: IndexMap<String, String>,
}

impl PackageJson {
    /// Declared ranges of one dependency kind, in manifest order
    pub fn dependencies_of(&self, kind: DependencyKind) -> &IndexMap<String, String> {
        match kind {
            DependencyKind::Normal => &self.dependencies,
            DependencyKind::Dev => &self.dev_dependencies,
            DependencyKind::Peer => &self.peer_dependencies,
            DependencyKind::Optional => &self.optional_dependencies,
        }
    }

    /// Every declared dependency name, each once
    pub fn dependency_names(&self) -> Vec<&str> {
        let names: IndexSet<&str> = DependencyKind::ALL
            .into_iter()
            .flat_map(|kind| self.dependencies_of(kind).keys())
            .map(String::as_str)
            .collect();
        names.into_iter().collect()
    }

    /// Range declared for `name`, from the first kind that declares it
    pub fn declared_range(&self, name: &str) -> Option<&str> {
        DependencyKind::ALL
            .into_iter()
            .find_map(|kind| self.dependencies_of(kind).get(name))
            .map(String::as_str)
    }
}

/// Parse package.json content; `file` only labels errors
pub fn parse_package_json(content: &str, file: &str) -> ConfigResult<PackageJson> {
    serde_json::from_str(content).map_err(|e| LockviewError::JsonParse {
        file: file.to_string(),
        message: e.to_string(),
    })
}

/// Load and parse package.json from file path
pub async fn load_from_file(path: &Utf8Path) -> ConfigResult<PackageJson> {
    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| LockviewError::io(format!("Failed to read {}", path), e))?;

    parse_package_json(&content, path.as_str())
}

/// A project directory and its manifest
#[derive(Debug, Clone)]
pub struct Project {
    /// Directory containing package.json
    pub dir: Utf8PathBuf,
    pub manifest: PackageJson,
}

/// Locates the project enclosing a working directory
pub struct ManifestLoader {
    /// Current working directory
    cwd: Utf8PathBuf,
}

impl ManifestLoader {
    /// Create a new manifest loader
    pub fn new(cwd: impl Into<Utf8PathBuf>) -> Self {
        Self { cwd: cwd.into() }
    }

    /// Find package.json in the working directory or its nearest ancestor
    pub fn resolve_manifest_path(&self) -> ConfigResult<Utf8PathBuf> {
        let mut current = self.cwd.as_path();

        loop {
            let manifest_path = current.join(MANIFEST_FILE);
            if manifest_path.is_file() {
                return Ok(manifest_path);
            }

            // Move up one directory
            match current.parent() {
                Some(parent) => current = parent,
                None => break,
            }
        }

        Err(LockviewError::ManifestNotFound {
            dir: self.cwd.to_string(),
        })
    }

    /// Load the enclosing project
    pub async fn load(&self) -> ConfigResult<Project> {
        let manifest_path = self.resolve_manifest_path()?;
        let manifest = load_from_file(&manifest_path).await?;
        let dir = manifest_path
            .parent()
            .map(Utf8Path::to_path_buf)
            .unwrap_or_else(|| self.cwd.clone());

        Ok(Project { dir, manifest })
    }
}
