//! npm registry API response types

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};
use sprig_core::types::{PackageMetadata, VersionInfo};

/// Package document returned by `GET {registry}/{name}`
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PackageMetadataResponse {
    /// Package name
    #[serde(default)]
    pub name: String,
    /// Package description (absent from abbreviated documents)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Named versions, e.g. "latest"
    #[serde(default, rename = "dist-tags")]
    pub dist_tags: HashMap<String, String>,
    /// All published versions
    #[serde(default)]
    pub versions: HashMap<String, VersionMetadata>,
}

/// Metadata for a specific package version
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct VersionMetadata {
    /// Version string
    #[serde(default)]
    pub version: String,
    /// Runtime dependencies
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dependencies: Option<HashMap<String, String>>,
}

impl From<PackageMetadataResponse> for PackageMetadata {
    fn from(response: PackageMetadataResponse) -> Self {
        let versions = response
            .versions
            .into_iter()
            .map(|(version, metadata)| {
                let dependencies: BTreeMap<String, String> =
                    metadata.dependencies.unwrap_or_default().into_iter().collect();
                (version, VersionInfo { dependencies })
            })
            .collect();

        PackageMetadata {
            name: response.name,
            versions,
            dist_tags: response.dist_tags.into_iter().collect(),
        }
    }
}
