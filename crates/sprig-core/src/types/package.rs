//! Package metadata types.
//!
//! Read-only snapshot of what a registry publishes for one package: every
//! version with its declared dependencies, plus the dist-tags.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Dist-tag the any-range resolves to
pub const LATEST_TAG: &str = "latest";

/// Everything the registry publishes for one package
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageMetadata {
    pub name: String,
    /// Version string (as published) to version details
    #[serde(default)]
    pub versions: BTreeMap<String, VersionInfo>,
    /// Tag name (e.g. "latest") to version string
    #[serde(default, rename = "dist-tags")]
    pub dist_tags: BTreeMap<String, String>,
}

/// Details of one published version
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionInfo {
    /// Dependency name to declared range text
    #[serde(default)]
    pub dependencies: BTreeMap<String, String>,
}

impl PackageMetadata {
    /// Create metadata with no published versions
    pub fn new(name: String) -> Self {
        Self {
            name,
            ..Self::default()
        }
    }

    /// Add a published version
    pub fn with_version(mut self, version: &str, info: VersionInfo) -> Self {
        self.versions.insert(version.to_string(), info);
        self
    }

    /// Point a dist-tag at a version
    pub fn with_tag(mut self, tag: &str, version: &str) -> Self {
        self.dist_tags.insert(tag.to_string(), version.to_string());
        self
    }

    /// Details of a published version
    pub fn version(&self, version: &str) -> Option<&VersionInfo> {
        self.versions.get(version)
    }

    /// Version the `latest` tag points at, if any
    pub fn latest(&self) -> Option<&str> {
        self.dist_tags.get(LATEST_TAG).map(String::as_str)
    }
}

impl VersionInfo {
    /// Create version details from `(name, range)` pairs
    pub fn with_dependencies<I, N, R>(dependencies: I) -> Self
    where
        I: IntoIterator<Item = (N, R)>,
        N: Into<String>,
        R: Into<String>,
    {
        Self {
            dependencies: dependencies
                .into_iter()
                .map(|(name, range)| (name.into(), range.into()))
                .collect(),
        }
    }

    /// Check if this version declares any dependency
    pub fn has_dependencies(&self) -> bool {
        !self.dependencies.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builders_and_lookup() {
        let metadata = PackageMetadata::new("js-tokens".to_string())
            .with_version("3.0.2", VersionInfo::default())
            .with_version("4.0.0", VersionInfo::default())
            .with_tag(LATEST_TAG, "4.0.0");

        assert_eq!(metadata.latest(), Some("4.0.0"));
        assert!(metadata.version("3.0.2").is_some());
        assert!(metadata.version("5.0.0").is_none());
    }

    #[test]
    fn test_deserialize_registry_shape() {
        let metadata: PackageMetadata = serde_json::from_value(serde_json::json!({
            "name": "loose-envify",
            "dist-tags": { "latest": "1.4.0" },
            "versions": {
                "1.4.0": { "dependencies": { "js-tokens": "^3.0.0 || ^4.0.0" } },
                "1.0.0": {}
            }
        }))
        .unwrap();

        assert_eq!(metadata.latest(), Some("1.4.0"));
        assert!(metadata.version("1.4.0").unwrap().has_dependencies());
        assert!(!metadata.version("1.0.0").unwrap().has_dependencies());
    }
}
