//! Installed dependency graph for lockview
//!
//! This crate loads what npm actually installed (from the lockfile `packages`
//! section) into a petgraph graph and renders it as a finite dependency tree,
//! even when the installed graph contains cycles.

pub mod graph;
pub mod lockfile;
pub mod tree;

// Re-export main types
pub use graph::{DependencyEdge, DependencyGraph, PackageId, PackageNode};
pub use lockfile::{load_installed_graph, LockPackage, Lockfile, HIDDEN_LOCKFILE, LOCKFILE};
pub use tree::{dependency_tree, dependency_tree_with, installed_tree, TreeOptions};

use lockview_core::error::LockviewError;

/// Result type for resolver operations
pub type ResolverResult<T> = Result<T, LockviewError>;
