//! Dependency tree rendering over the installed graph
//!
//! The installed graph may contain cycles (peer loops, mutual dependencies).
//! Expansion tracks the `name@version` keys on the current root-to-node path;
//! a key already on the path is emitted once more as a leaf and not expanded.
//! Keys leave the path when their subtree is finished, so a package reached
//! again through an unrelated branch is expanded in full there too.

use std::collections::HashSet;

use camino::Utf8Path;
use petgraph::graph::NodeIndex;
use tracing::debug;

use lockview_core::types::TreeNode;
use crate::graph::{DependencyGraph, PackageId};
use crate::lockfile::load_installed_graph;

/// Controls how far the tree is expanded
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TreeOptions {
    /// Deepest level shown, rendered without children; direct dependencies are level 1
    pub max_depth: Option<usize>,
}

impl TreeOptions {
    /// Expand at most `depth` levels
    pub fn with_max_depth(depth: usize) -> Self {
        Self { max_depth: Some(depth) }
    }
}

/// One tree per direct dependency of the project, fully expanded
pub fn dependency_tree(graph: &DependencyGraph) -> Vec<TreeNode> {
    dependency_tree_with(graph, TreeOptions::default())
}

/// One tree per direct dependency of the project
pub fn dependency_tree_with(graph: &DependencyGraph, options: TreeOptions) -> Vec<TreeNode> {
    let mut builder = TreeBuilder {
        graph,
        options,
        active: HashSet::new(),
    };

    let forest: Vec<TreeNode> = graph
        .dependencies(graph.root())
        .into_iter()
        .filter_map(|(child, _)| builder.expand(child, 1))
        .collect();

    debug!(
        "Built {} dependency trees ({} nodes)",
        forest.len(),
        forest.iter().map(TreeNode::node_count).sum::<usize>()
    );
    forest
}

/// Dependency forest of the project at `project_dir`; empty when nothing is installed
pub async fn installed_tree(project_dir: &Utf8Path, options: TreeOptions) -> Vec<TreeNode> {
    match load_installed_graph(project_dir).await {
        Some(graph) => dependency_tree_with(&graph, options),
        None => Vec::new(),
    }
}

struct TreeBuilder<'g> {
    graph: &'g DependencyGraph,
    options: TreeOptions,
    /// Keys on the path from the current root to the node being expanded
    active: HashSet<PackageId>,
}

impl TreeBuilder<'_> {
    fn expand(&mut self, index: NodeIndex, level: usize) -> Option<TreeNode> {
        let package = self.graph.package(index)?;
        let id = &package.id;

        if self.active.contains(id) {
            return Some(TreeNode::leaf(&id.name, &id.version));
        }
        if self.options.max_depth.is_some_and(|max| level >= max) {
            return Some(TreeNode::leaf(&id.name, &id.version));
        }

        self.active.insert(id.clone());
        let children = self
            .graph
            .dependencies(index)
            .into_iter()
            .filter_map(|(child, _)| self.expand(child, level + 1))
            .collect();
        self.active.remove(id);

        Some(TreeNode::with_children(&id.name, &id.version, children))
    }
}

#[cfg(test)]
mod tests;
