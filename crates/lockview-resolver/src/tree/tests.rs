//! Unit tests for dependency tree rendering

use super::*;

use proptest::prelude::*;

use crate::graph::{DependencyEdge, PackageNode};

/// Graph with one installed copy per package, wired by index pairs
struct Fixture {
    graph: DependencyGraph,
    nodes: Vec<NodeIndex>,
}

impl Fixture {
    fn new(packages: &[(&str, &str)]) -> Self {
        let mut graph = DependencyGraph::new(PackageNode::new("app", "1.0.0", ""));
        let nodes = packages
            .iter()
            .map(|(name, version)| {
                graph.add_package(PackageNode::new(*name, *version, format!("node_modules/{}", name)))
            })
            .collect();
        Self { graph, nodes }
    }

    fn root_dep(&mut self, to: usize) -> &mut Self {
        let root = self.graph.root();
        self.graph.add_dependency(root, self.nodes[to], DependencyEdge::normal("*"));
        self
    }

    fn dep(&mut self, from: usize, to: usize) -> &mut Self {
        self.graph.add_dependency(self.nodes[from], self.nodes[to], DependencyEdge::normal("*"));
        self
    }
}

fn names(nodes: &[TreeNode]) -> Vec<&str> {
    nodes.iter().map(|node| node.name.as_str()).collect()
}

#[test]
fn test_empty_project() {
    let fixture = Fixture::new(&[]);
    assert!(dependency_tree(&fixture.graph).is_empty());
}

#[test]
fn test_mutual_dependency_is_cut() {
    let mut fixture = Fixture::new(&[("a", "1.0.0"), ("b", "1.0.0")]);
    fixture.root_dep(0).dep(0, 1).dep(1, 0);

    let forest = dependency_tree(&fixture.graph);

    let expected = vec![TreeNode::with_children(
        "a",
        "1.0.0",
        vec![TreeNode::with_children("b", "1.0.0", vec![TreeNode::leaf("a", "1.0.0")])],
    )];
    assert_eq!(forest, expected);
}

#[test]
fn test_self_dependency_is_cut() {
    let mut fixture = Fixture::new(&[("a", "1.0.0")]);
    fixture.root_dep(0).dep(0, 0);

    let forest = dependency_tree(&fixture.graph);

    assert_eq!(forest[0].children, vec![TreeNode::leaf("a", "1.0.0")]);
}

#[test]
fn test_shared_dependency_expanded_in_every_branch() {
    // app -> a -> c -> d, app -> b -> c -> d
    let mut fixture = Fixture::new(&[("a", "1.0.0"), ("b", "1.0.0"), ("c", "1.0.0"), ("d", "1.0.0")]);
    fixture.root_dep(0).root_dep(1).dep(0, 2).dep(1, 2).dep(2, 3);

    let forest = dependency_tree(&fixture.graph);

    assert_eq!(names(&forest), vec!["a", "b"]);
    for top in &forest {
        let c = &top.children[0];
        assert_eq!(c.name, "c");
        assert_eq!(names(&c.children), vec!["d"]);
    }
}

#[test]
fn test_cycle_reached_from_two_roots() {
    // Both roots enter the a <-> b loop; each renders it fully once
    let mut fixture = Fixture::new(&[("a", "1.0.0"), ("b", "1.0.0")]);
    fixture.root_dep(0).root_dep(1).dep(0, 1).dep(1, 0);

    let forest = dependency_tree(&fixture.graph);

    assert_eq!(forest.len(), 2);
    assert_eq!(forest[0].node_count(), 3);
    assert_eq!(forest[1].node_count(), 3);
    assert_eq!(forest[1].children[0].children, vec![TreeNode::leaf("b", "1.0.0")]);
}

#[test]
fn test_children_follow_edge_order() {
    let mut fixture = Fixture::new(&[("top", "1.0.0"), ("zod", "3.0.0"), ("axios", "1.0.0"), ("ms", "2.0.0")]);
    fixture.root_dep(0).dep(0, 1).dep(0, 2).dep(0, 3);

    let forest = dependency_tree(&fixture.graph);

    assert_eq!(names(&forest[0].children), vec!["zod", "axios", "ms"]);
}

#[test]
fn test_same_key_at_two_locations_is_cut() {
    // Two installed copies of b@1.0.0; the nested one re-enters the path key
    let mut graph = DependencyGraph::new(PackageNode::new("app", "1.0.0", ""));
    let root = graph.root();
    let b = graph.add_package(PackageNode::new("b", "1.0.0", "node_modules/b"));
    let a = graph.add_package(PackageNode::new("a", "1.0.0", "node_modules/a"));
    let nested_b = graph.add_package(PackageNode::new("b", "1.0.0", "node_modules/a/node_modules/b"));
    graph.add_dependency(root, b, DependencyEdge::normal("1"));
    graph.add_dependency(b, a, DependencyEdge::normal("1"));
    graph.add_dependency(a, nested_b, DependencyEdge::normal("1"));
    graph.add_dependency(nested_b, a, DependencyEdge::normal("1"));

    let forest = dependency_tree(&graph);

    let a_node = &forest[0].children[0];
    assert_eq!(a_node.children, vec![TreeNode::leaf("b", "1.0.0")]);
}

#[test]
fn test_max_depth() {
    let mut fixture = Fixture::new(&[("a", "1.0.0"), ("b", "1.0.0"), ("c", "1.0.0")]);
    fixture.root_dep(0).dep(0, 1).dep(1, 2);

    let full = dependency_tree(&fixture.graph);
    assert_eq!(full[0].depth(), 3);

    let shallow = dependency_tree_with(&fixture.graph, TreeOptions::with_max_depth(2));
    assert_eq!(shallow[0].depth(), 2);
    assert_eq!(shallow[0].children, vec![TreeNode::leaf("b", "1.0.0")]);

    let top_only = dependency_tree_with(&fixture.graph, TreeOptions::with_max_depth(1));
    assert_eq!(top_only, vec![TreeNode::leaf("a", "1.0.0")]);
}

#[tokio::test]
async fn test_installed_tree_of_uninstalled_project_is_empty() {
    let dir = tempfile::tempdir().unwrap();
    let path = camino::Utf8PathBuf::try_from(dir.path().to_path_buf()).unwrap();
    std::fs::write(path.join("package.json"), r#"{"dependencies":{"lodash":"^4.0.0"}}"#).unwrap();

    assert!(installed_tree(&path, TreeOptions::default()).await.is_empty());
}

proptest! {
    #[test]
    fn prop_random_graphs_render_finite_trees(
        size in 1usize..7,
        edges in prop::collection::vec((0usize..7, 0usize..7), 0..20),
        roots in prop::collection::vec(0usize..7, 1..4),
    ) {
        let packages: Vec<(String, String)> = (0..size)
            .map(|i| (format!("pkg-{}", i), "1.0.0".to_string()))
            .collect();
        let refs: Vec<(&str, &str)> = packages.iter().map(|(n, v)| (n.as_str(), v.as_str())).collect();
        let mut fixture = Fixture::new(&refs);

        for root in &roots {
            fixture.root_dep(root % size);
        }
        for (from, to) in &edges {
            fixture.dep(from % size, to % size);
        }

        let forest = dependency_tree(&fixture.graph);
        prop_assert_eq!(forest.len(), roots.len());

        // A path holds each key at most once, plus the closing leaf
        for tree in &forest {
            prop_assert!(tree.depth() <= size + 1);
        }
    }
}
