//! # lockview-core
//!
//! Core types and errors shared across all lockview crates.
//!
//! This crate provides:
//! - PackageMetadata, an open record of registry-supplied fields
//! - TreeNode, the finite output of the dependency graph builder
//! - Outdated classification by simple segment comparison
//! - LockviewError enum for unified error handling
//!
//! ## Architecture
//!
//! The crate is organized into modules:
//! - `types`: Core data types (PackageMetadata, TreeNode, etc.)
//! - `error`: Error types and result aliases

pub mod error;
pub mod types;

// Re-export commonly used types
pub use error::{LockviewError, LockviewResult};
pub use types::{DependencyKind, OutdatedEntry, OutdatedLevel, PackageMetadata, TreeNode};
