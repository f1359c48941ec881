//! Core data types for lockview.
//!
//! This module provides the types shared between the registry engine, the
//! graph builder and the command line front end:
//! - Registry package metadata
//! - Dependency kinds
//! - Rendered dependency trees
//! - Outdated classification

pub mod dependency;
pub mod package;
pub mod tree;
pub mod version;

// Re-export all public types
pub use dependency::DependencyKind;
pub use package::PackageMetadata;
pub use tree::TreeNode;
pub use version::{outdated_level, version_segments, OutdatedEntry, OutdatedLevel};
