//! npm lockfile loading
//!
//! Builds the installed-package graph from the `packages` section of a v2/v3
//! lockfile. Each key is an install location; a dependency of the package at
//! `L` resolves to the nearest `<ancestor of L>/node_modules/<dep>` entry,
//! the way Node's module lookup does.

use std::collections::HashMap;

use camino::Utf8Path;
use indexmap::IndexMap;
use petgraph::graph::NodeIndex;
use serde::Deserialize;
use tracing::{debug, info, warn};

use lockview_core::error::LockviewError;
use lockview_core::types::DependencyKind;
use crate::graph::{DependencyEdge, DependencyGraph, PackageNode};
use crate::ResolverResult;

/// Lockfile npm keeps inside `node_modules`, describing what is actually installed
pub const HIDDEN_LOCKFILE: &str = "node_modules/.package-lock.json";

/// Project lockfile
pub const LOCKFILE: &str = "package-lock.json";

const MANIFEST: &str = "package.json";

/// One entry of the lockfile `packages` section (also reads `package.json`)
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LockPackage {
    pub name: Option<String>,
    pub version: Option<String>,
    pub resolved: Option<String>,
    #[serde(default)]
    pub link: bool,
    #[serde(default)]
    pub dependencies: IndexMap<String, String>,
    #[serde(default)]
    pub dev_dependencies: IndexMap<String, String>,
    #[serde(default)]
    pub optional_dependencies: IndexMap<String, String>,
    #[serde(default)]
    pub peer_dependencies: IndexMap<String, String>,
}

impl LockPackage {
    /// Declared ranges of one dependency kind
    pub fn declared(&self, kind: DependencyKind) -> &IndexMap<String, String> {
        match kind {
            DependencyKind::Normal => &self.dependencies,
            DependencyKind::Dev => &self.dev_dependencies,
            DependencyKind::Optional => &self.optional_dependencies,
            DependencyKind::Peer => &self.peer_dependencies,
        }
    }
}

/// Parsed lockfile
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Lockfile {
    pub name: Option<String>,
    pub version: Option<String>,
    #[serde(default)]
    pub lockfile_version: u32,
    #[serde(default)]
    pub packages: IndexMap<String, LockPackage>,
}

impl Lockfile {
    /// Parse lockfile content; `file` only labels errors
    pub fn parse(content: &str, file: &str) -> ResolverResult<Self> {
        let lockfile: Lockfile = serde_json::from_str(content).map_err(|e| LockviewError::JsonParse {
            file: file.to_string(),
            message: e.to_string(),
        })?;

        if lockfile.lockfile_version < 2 {
            return Err(LockviewError::JsonParse {
                file: file.to_string(),
                message: format!(
                    "lockfileVersion {} has no packages section; reinstall with npm 7 or newer",
                    lockfile.lockfile_version
                ),
            });
        }

        Ok(lockfile)
    }

    /// Build the installed graph.
    ///
    /// The project's own dependencies come from the `""` entry; the hidden
    /// lockfile has none, so `manifest` stands in for it.
    pub fn into_graph(self, manifest: Option<LockPackage>) -> DependencyGraph {
        let project = self.packages.get("").cloned().or(manifest).unwrap_or_default();
        let project_name = project
            .name
            .clone()
            .or_else(|| self.name.clone())
            .unwrap_or_else(|| "root".to_string());
        let project_version = project
            .version
            .clone()
            .or_else(|| self.version.clone())
            .unwrap_or_default();

        let mut graph = DependencyGraph::new(PackageNode::new(project_name, project_version, ""));
        let mut links: HashMap<&str, &str> = HashMap::new();

        for (location, entry) in &self.packages {
            if location.is_empty() {
                continue;
            }
            if entry.link {
                if let Some(target) = &entry.resolved {
                    links.insert(location, target);
                }
                continue;
            }
            graph.add_package(PackageNode::new(
                package_name(location, entry),
                entry.version.clone().unwrap_or_default(),
                location.clone(),
            ));
        }

        let installed = self
            .packages
            .iter()
            .filter(|(location, entry)| !location.is_empty() && !entry.link);
        let dependents = std::iter::once(("", &project)).chain(installed.map(|(l, e)| (l.as_str(), e)));

        let mut skipped = 0usize;
        for (location, entry) in dependents {
            let Some(from) = graph.at_location(location) else {
                continue;
            };

            for kind in DependencyKind::ALL {
                // Dev dependencies of installed packages are never installed
                if kind == DependencyKind::Dev && !location.is_empty() {
                    continue;
                }

                for (dep, spec) in entry.declared(kind) {
                    match resolve_dependency(&graph, &links, location, dep) {
                        Some(to) => graph.add_dependency(from, to, DependencyEdge::new(spec.as_str(), kind)),
                        None => {
                            skipped += 1;
                            if kind.may_be_missing() {
                                debug!("{} {} '{}' is not installed", display_location(location), kind, dep);
                            } else {
                                warn!("{} depends on '{}' but it is not installed", display_location(location), dep);
                            }
                        },
                    }
                }
            }
        }

        debug!(
            cyclic = graph.has_cycles(),
            "Installed graph: {} packages, {} edges, {} unresolved",
            graph.package_count(),
            graph.dependency_count(),
            skipped
        );
        graph
    }
}

/// Load the installed graph of the project at `project_dir`.
///
/// Returns `None` when nothing is installed or no lockfile can be read.
pub async fn load_installed_graph(project_dir: &Utf8Path) -> Option<DependencyGraph> {
    let node_modules = project_dir.join("node_modules");
    if !tokio::fs::try_exists(&node_modules).await.unwrap_or(false) {
        debug!("No node_modules in {}", project_dir);
        return None;
    }

    let manifest = read_manifest(project_dir).await;

    for file in [HIDDEN_LOCKFILE, LOCKFILE] {
        let path = project_dir.join(file);
        let content = match tokio::fs::read_to_string(&path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("No lockfile at {}", path);
                continue;
            },
            Err(e) => {
                warn!("Failed to read {}: {}", path, e);
                continue;
            },
        };

        match Lockfile::parse(&content, path.as_str()) {
            Ok(lockfile) => {
                info!("Loaded {} ({} entries)", path, lockfile.packages.len());
                return Some(lockfile.into_graph(manifest));
            },
            Err(e) => warn!("Ignoring {}", e),
        }
    }

    None
}

async fn read_manifest(project_dir: &Utf8Path) -> Option<LockPackage> {
    let path = project_dir.join(MANIFEST);
    let content = tokio::fs::read_to_string(&path).await.ok()?;

    match serde_json::from_str(&content) {
        Ok(manifest) => Some(manifest),
        Err(e) => {
            debug!("Failed to parse {}: {}", path, e);
            None
        },
    }
}

/// Nearest installed copy of `dep` visible from `from`
fn resolve_dependency(
    graph: &DependencyGraph,
    links: &HashMap<&str, &str>,
    from: &str,
    dep: &str,
) -> Option<NodeIndex> {
    let mut base = from;
    loop {
        let candidate = if base.is_empty() {
            format!("node_modules/{}", dep)
        } else {
            format!("{}/node_modules/{}", base, dep)
        };
        let target = links.get(candidate.as_str()).copied().unwrap_or(candidate.as_str());

        if let Some(index) = graph.at_location(target) {
            return Some(index);
        }
        if base.is_empty() {
            return None;
        }
        base = parent_location(base);
    }
}

/// `node_modules/a/node_modules/b` → `node_modules/a`, `node_modules/a` → ``
fn parent_location(location: &str) -> &str {
    match location.rfind("/node_modules/") {
        Some(end) => &location[..end],
        None => "",
    }
}

fn package_name(location: &str, entry: &LockPackage) -> String {
    if let Some((_, name)) = location.rsplit_once("node_modules/") {
        return name.to_string();
    }
    // Workspace package outside node_modules
    entry
        .name
        .clone()
        .unwrap_or_else(|| location.rsplit('/').next().unwrap_or(location).to_string())
}

fn display_location(location: &str) -> &str {
    if location.is_empty() {
        "project"
    } else {
        location
    }
}
