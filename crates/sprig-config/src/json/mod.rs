//! package.json reading
//!
//! Only the fields sprig needs are modelled; everything else in the manifest
//! is ignored.

use std::collections::BTreeMap;

use camino::Utf8Path;
use serde::{Deserialize, Serialize};
use sprig_core::error::SprigError;
use sprig_core::types::RangeExpression;

use crate::ConfigResult;

/// Name of the npm manifest file
pub const PACKAGE_JSON: &str = "package.json";

/// The dependency-relevant part of a package.json
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageJson {
    /// Package name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Package version
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,

    /// Runtime dependencies
    #[serde(default)]
    pub dependencies: BTreeMap<String, String>,

    /// Development dependencies
    #[serde(default, rename = "devDependencies")]
    pub dev_dependencies: BTreeMap<String, String>,
}

impl PackageJson {
    /// Dependencies to resolve; a runtime entry wins over a dev entry of the same name
    pub fn dependencies_to_resolve(&self, include_dev: bool) -> BTreeMap<String, String> {
        let mut merged = self.dependencies.clone();
        if include_dev {
            for (name, range) in &self.dev_dependencies {
                merged.entry(name.clone()).or_insert_with(|| range.clone());
            }
        }
        merged
    }

    /// Display name, `name@version` when both are present
    pub fn display_name(&self) -> String {
        match (&self.name, &self.version) {
            (Some(name), Some(version)) => format!("{}@{}", name, version),
            (Some(name), None) => name.clone(),
            _ => "(unnamed package)".to_string(),
        }
    }
}

/// Parse JSON string to PackageJson
pub fn parse_package_json(content: &str) -> ConfigResult<PackageJson> {
    let package: PackageJson = serde_json::from_str(content).map_err(|e| SprigError::JsonParse {
        file: PACKAGE_JSON.to_string(),
        message: e.to_string(),
    })?;

    validate_dependencies(&package.dependencies, "dependencies")?;
    validate_dependencies(&package.dev_dependencies, "devDependencies")?;
    Ok(package)
}

/// Load and parse package.json from file path
pub async fn load_from_file(path: &Utf8Path) -> ConfigResult<PackageJson> {
    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| SprigError::io(format!("Failed to read {}", path), e))?;

    parse_package_json(&content).map_err(|e| match e {
        SprigError::JsonParse { message, .. } => SprigError::JsonParse {
            file: path.to_string(),
            message,
        },
        other => other,
    })
}

/// Reject names the registry cannot serve and ranges the matcher does not understand
fn validate_dependencies(deps: &BTreeMap<String, String>, section: &str) -> ConfigResult<()> {
    for (name, range) in deps {
        if !is_valid_package_name(name) {
            return Err(SprigError::ConfigValidation {
                field: format!("{}.{}", section, name),
                reason: "not a valid npm package name".to_string(),
            });
        }
        RangeExpression::parse(range)?;
    }
    Ok(())
}

/// Check if a package name is valid (npm-compatible)
fn is_valid_package_name(name: &str) -> bool {
    if name.is_empty() || name.len() > 214 {
        return false;
    }

    // Must start with alphanumeric or @
    let first = name.chars().next().unwrap_or(' ');
    if !first.is_ascii_alphanumeric() && first != '@' {
        return false;
    }

    // Scoped names carry exactly one slash
    if name.starts_with('@') && name.matches('/').count() != 1 {
        return false;
    }

    name.chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.' | '/' | '@'))
}
