//! Version selection against published metadata
//!
//! Builds the candidate set of a range (every published version the range
//! accepts) and folds it through the comparator to pick the highest.

use sprig_core::types::{PackageMetadata, RangeExpression, Version, VersionComparator};
use tracing::debug;

/// A published version, parsed, next to the key it was published under
#[derive(Debug, Clone)]
struct Published {
    version: Version,
    key: String,
}

/// Version selector for finding best matching versions
#[derive(Debug, Clone)]
pub struct VersionSelector {
    /// Parsable published versions, in registry key order
    available: Vec<Published>,
    /// Target of the `latest` dist-tag, when it names a published version
    latest: Option<String>,
}

impl VersionSelector {
    /// Collect the published versions of a package.
    ///
    /// Version keys that do not parse are skipped.
    pub fn new(metadata: &PackageMetadata) -> Self {
        let available = metadata
            .versions
            .keys()
            .filter_map(|key| match Version::parse(key) {
                Ok(version) => Some(Published {
                    version,
                    key: key.clone(),
                }),
                Err(error) => {
                    debug!("Skipping published version {}@{}: {}", metadata.name, key, error);
                    None
                },
            })
            .collect();

        let latest = metadata
            .latest()
            .filter(|tag| metadata.versions.contains_key(*tag))
            .map(str::to_string);

        Self { available, latest }
    }

    /// Number of parsable published versions
    pub fn len(&self) -> usize {
        self.available.len()
    }

    pub fn is_empty(&self) -> bool {
        self.available.is_empty()
    }

    /// Select the published key of the highest version the range accepts.
    ///
    /// An any-range takes the `latest` dist-tag; without a usable tag it falls
    /// back to the highest release like any other range.
    pub fn select(&self, range: &RangeExpression, comparator: &VersionComparator) -> Option<&str> {
        if range.is_any() {
            if let Some(latest) = &self.latest {
                return Some(latest.as_str());
            }
        }

        let best = comparator.max_of(self.find_matching(range))?;
        self.available
            .iter()
            .find(|published| &published.version == best)
            .map(|published| published.key.as_str())
    }

    /// Candidate set: every published version the range accepts
    pub fn find_matching<'a>(&'a self, range: &'a RangeExpression) -> impl Iterator<Item = &'a Version> + 'a {
        self.available
            .iter()
            .map(|published| &published.version)
            .filter(move |version| range.is_satisfied_by(version))
    }
}
