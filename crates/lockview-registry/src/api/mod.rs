//! npm registry endpoint addressing
//!
//! lockview talks to exactly one endpoint: `GET {registry}/{name}/latest`,
//! which answers with the manifest of the most recent published version.

use url::Url;

use lockview_core::error::LockviewError;
use crate::RegistryResult;

/// Public npm registry
pub const DEFAULT_REGISTRY: &str = "https://registry.npmjs.org";

/// Encode package name for URL (handle scoped packages)
pub fn encode_package_name(name: &str) -> String {
    if name.starts_with('@') {
        // Scoped package: @org/pkg → @org%2fpkg
        name.replace('/', "%2f")
    } else {
        name.to_string()
    }
}

/// Build the latest-version URL for a package
pub fn latest_url(registry_url: &str, name: &str) -> RegistryResult<Url> {
    let base = registry_url.trim_end_matches('/');
    let raw = format!("{}/{}/latest", base, encode_package_name(name));

    Url::parse(&raw).map_err(|e| LockviewError::ConfigValidation {
        field: "registry".to_string(),
        reason: format!("Cannot build registry URL '{}': {}", raw, e),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_package_name() {
        // Regular package
        assert_eq!(encode_package_name("lodash"), "lodash");

        // Scoped package
        assert_eq!(encode_package_name("@types/node"), "@types%2fnode");
    }

    #[test]
    fn test_latest_url() {
        let url = latest_url("https://registry.npmjs.org/", "left-pad").unwrap();
        assert_eq!(url.as_str(), "https://registry.npmjs.org/left-pad/latest");

        let url = latest_url("http://localhost:4873", "@babel/core").unwrap();
        assert_eq!(url.path(), "/@babel%2fcore/latest");
    }

    #[test]
    fn test_latest_url_rejects_garbage() {
        assert!(latest_url("not a url", "lodash").is_err());
    }
}
