//! Version comparison for outdated reports.
//!
//! This is deliberately not semver: range prefixes are stripped and the
//! dot-separated numeric segments are compared position by position. Whatever
//! trails the digits of a segment (prerelease tags, build metadata) is ignored.

use serde::{Deserialize, Serialize};
use std::fmt;

/// How far an installed version lags behind the latest published one
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum OutdatedLevel {
    UpToDate,
    Patch,
    Minor,
    Major,
}

impl OutdatedLevel {
    pub fn is_outdated(self) -> bool {
        self != OutdatedLevel::UpToDate
    }
}

impl fmt::Display for OutdatedLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            OutdatedLevel::UpToDate => "up to date",
            OutdatedLevel::Patch => "patch",
            OutdatedLevel::Minor => "minor",
            OutdatedLevel::Major => "major",
        };
        f.write_str(label)
    }
}

/// One row of an outdated report
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutdatedEntry {
    pub name: String,
    /// Installed version, or the declared range when nothing is installed
    pub current: String,
    pub latest: String,
    pub level: OutdatedLevel,
}

impl OutdatedEntry {
    pub fn new(name: impl Into<String>, current: impl Into<String>, latest: impl Into<String>) -> Self {
        let current = current.into();
        let latest = latest.into();
        let level = outdated_level(&current, &latest);
        Self {
            name: name.into(),
            current,
            latest,
            level,
        }
    }
}

/// Split a version (or simple range such as `^1.2.3`) into numeric segments
///
/// Leading non-digit characters are dropped. A segment without leading digits
/// is `None`.
pub fn version_segments(input: &str) -> [Option<u64>; 3] {
    let trimmed = input.trim_start_matches(|c: char| !c.is_ascii_digit());
    let mut segments = [None; 3];

    for (slot, part) in segments.iter_mut().zip(trimmed.split('.')) {
        let digits: String = part.chars().take_while(char::is_ascii_digit).collect();
        *slot = digits.parse().ok();
    }

    segments
}

/// Classify the gap between `current` and `latest`
///
/// The first differing segment decides the level; identical segments mean
/// the package is up to date.
pub fn outdated_level(current: &str, latest: &str) -> OutdatedLevel {
    let current = version_segments(current);
    let latest = version_segments(latest);

    if current[0] != latest[0] {
        OutdatedLevel::Major
    } else if current[1] != latest[1] {
        OutdatedLevel::Minor
    } else if current[2] != latest[2] {
        OutdatedLevel::Patch
    } else {
        OutdatedLevel::UpToDate
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_segments() {
        assert_eq!(version_segments("1.2.3"), [Some(1), Some(2), Some(3)]);
        assert_eq!(version_segments("^4.17.21"), [Some(4), Some(17), Some(21)]);
        assert_eq!(version_segments(">=2.0"), [Some(2), Some(0), None]);
        assert_eq!(version_segments("1.0.0-beta.1"), [Some(1), Some(0), Some(0)]);
        assert_eq!(version_segments("latest"), [None, None, None]);
    }

    #[test]
    fn test_outdated_level() {
        assert_eq!(outdated_level("1.2.3", "2.0.0"), OutdatedLevel::Major);
        assert_eq!(outdated_level("^1.2.3", "1.3.0"), OutdatedLevel::Minor);
        assert_eq!(outdated_level("~1.2.3", "1.2.9"), OutdatedLevel::Patch);
        assert_eq!(outdated_level("4.17.21", "4.17.21"), OutdatedLevel::UpToDate);
        assert_eq!(outdated_level("v3.0.0", "3.0.0"), OutdatedLevel::UpToDate);
    }

    #[test]
    fn test_outdated_entry() {
        let entry = OutdatedEntry::new("react", "17.0.2", "18.3.1");
        assert_eq!(entry.level, OutdatedLevel::Major);
        assert!(entry.level.is_outdated());
        assert_eq!(entry.level.to_string(), "major");
    }

    #[test]
    fn test_level_ordering() {
        assert!(OutdatedLevel::Major > OutdatedLevel::Minor);
        assert!(OutdatedLevel::Patch > OutdatedLevel::UpToDate);
    }
}
