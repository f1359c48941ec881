//! Installed dependency graph implementation using petgraph
//!
//! Nodes are installed package instances keyed by their install location
//! (`node_modules/a/node_modules/b`), so the same `name@version` may appear
//! more than once. Edges keep the order in which they were added.

use std::collections::HashMap;
use std::fmt;

use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use serde::{Deserialize, Serialize};

use lockview_core::types::DependencyKind;

/// Unique identifier for a package version
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PackageId {
    /// Package name (e.g., "lodash" or "@types/node")
    pub name: String,
    /// Installed version
    pub version: String,
}

/// Node in the dependency graph representing an installed package
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageNode {
    /// Unique package identifier
    pub id: PackageId,
    /// Install location relative to the project root ("" for the project)
    pub location: String,
}

/// Edge in the dependency graph representing a dependency relationship
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DependencyEdge {
    /// Declared range, as written by the dependent
    pub spec: String,
    /// Type of dependency
    pub kind: DependencyKind,
}

/// Installed-package graph rooted at the project itself
#[derive(Debug, Clone)]
pub struct DependencyGraph {
    /// Underlying directed graph
    graph: DiGraph<PackageNode, DependencyEdge>,
    /// The project node
    root: NodeIndex,
    /// Map from install location to NodeIndex for fast lookups
    locations: HashMap<String, NodeIndex>,
}

impl DependencyGraph {
    /// Create a graph containing only the project node
    pub fn new(root: PackageNode) -> Self {
        let mut graph = DiGraph::new();
        let mut locations = HashMap::new();

        let location = root.location.clone();
        let root = graph.add_node(root);
        locations.insert(location, root);

        Self { graph, root, locations }
    }

    /// The project node
    pub fn root(&self) -> NodeIndex {
        self.root
    }

    /// Add an installed package; a location already present keeps its node
    pub fn add_package(&mut self, package: PackageNode) -> NodeIndex {
        if let Some(existing_index) = self.locations.get(&package.location) {
            return *existing_index;
        }

        let location = package.location.clone();
        let node_index = self.graph.add_node(package);
        self.locations.insert(location, node_index);

        node_index
    }

    /// Add dependency edge between two packages
    pub fn add_dependency(&mut self, from: NodeIndex, to: NodeIndex, edge: DependencyEdge) {
        self.graph.add_edge(from, to, edge);
    }

    /// Look up a package by install location
    pub fn at_location(&self, location: &str) -> Option<NodeIndex> {
        self.locations.get(location).copied()
    }

    /// Get package node by index
    pub fn package(&self, index: NodeIndex) -> Option<&PackageNode> {
        self.graph.node_weight(index)
    }

    /// Outgoing dependencies of a package, in the order they were added
    pub fn dependencies(&self, index: NodeIndex) -> Vec<(NodeIndex, &DependencyEdge)> {
        let mut edges: Vec<_> = self
            .graph
            .edges(index)
            .map(|edge| (edge.target(), edge.weight()))
            .collect();
        // petgraph lists the most recently added edge first
        edges.reverse();
        edges
    }

    /// Name and installed version of every direct dependency of the project
    pub fn direct_versions(&self) -> Vec<(&str, &str)> {
        self.dependencies(self.root)
            .into_iter()
            .filter_map(|(index, _)| self.package(index))
            .map(|node| (node.name(), node.version()))
            .collect()
    }

    /// Get number of packages in the graph, the project included
    pub fn package_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Get number of dependencies in the graph
    pub fn dependency_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Whether any package can reach itself
    pub fn has_cycles(&self) -> bool {
        petgraph::algo::is_cyclic_directed(&self.graph)
    }
}

impl PackageId {
    /// Create a new package ID
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
        }
    }
}

impl fmt::Display for PackageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.name, self.version)
    }
}

impl PackageNode {
    /// Create a new package node
    pub fn new(name: impl Into<String>, version: impl Into<String>, location: impl Into<String>) -> Self {
        Self {
            id: PackageId::new(name, version),
            location: location.into(),
        }
    }

    pub fn name(&self) -> &str {
        &self.id.name
    }

    pub fn version(&self) -> &str {
        &self.id.version
    }
}

impl DependencyEdge {
    /// Create a new dependency edge
    pub fn new(spec: impl Into<String>, kind: DependencyKind) -> Self {
        Self {
            spec: spec.into(),
            kind,
        }
    }

    /// Create a normal dependency edge
    pub fn normal(spec: impl Into<String>) -> Self {
        Self::new(spec, DependencyKind::Normal)
    }

    /// Create a peer dependency edge
    pub fn peer(spec: impl Into<String>) -> Self {
        Self::new(spec, DependencyKind::Peer)
    }
}
