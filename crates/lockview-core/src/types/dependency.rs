//! Dependency kinds.
//!
//! Mirrors the four dependency maps of an npm manifest.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Type of dependency
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DependencyKind {
    /// Normal runtime dependency
    Normal,
    /// Development-only dependency
    Dev,
    /// Peer dependency (must be provided by consumer)
    Peer,
    /// Optional dependency (can be missing)
    Optional,
}

impl DependencyKind {
    /// All kinds, in the order npm lists them
    pub const ALL: [DependencyKind; 4] = [
        DependencyKind::Normal,
        DependencyKind::Dev,
        DependencyKind::Optional,
        DependencyKind::Peer,
    ];

    /// Manifest field holding this kind of dependency
    pub fn manifest_field(self) -> &'static str {
        match self {
            DependencyKind::Normal => "dependencies",
            DependencyKind::Dev => "devDependencies",
            DependencyKind::Peer => "peerDependencies",
            DependencyKind::Optional => "optionalDependencies",
        }
    }

    /// Whether a missing target for this kind is expected
    pub fn may_be_missing(self) -> bool {
        matches!(self, DependencyKind::Optional | DependencyKind::Peer)
    }
}

impl fmt::Display for DependencyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.manifest_field())
    }
}
