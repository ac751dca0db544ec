//! Metadata sources the resolver fetches through

use std::collections::HashMap;
use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use camino::Utf8Path;
use sprig_core::error::SprigError;
use sprig_core::types::PackageMetadata;

use crate::api::PackageMetadataResponse;
use crate::RegistryResult;

/// Anything that can produce a package's published metadata.
///
/// Implementations fail with `PackageNotFound` for unknown packages and
/// `RegistryUnavailable` when the backing store cannot be reached.
pub trait RegistrySource: Send + Sync {
    /// Fetch every published version and dist-tag of `name`
    fn fetch_metadata(
        &self,
        name: &str,
    ) -> impl Future<Output = RegistryResult<Arc<PackageMetadata>>> + Send;
}

impl<R: RegistrySource> RegistrySource for Arc<R> {
    async fn fetch_metadata(&self, name: &str) -> RegistryResult<Arc<PackageMetadata>> {
        (**self).fetch_metadata(name).await
    }
}

/// In-memory registry, loaded from npm-style package documents
#[derive(Debug, Default)]
pub struct StaticRegistry {
    packages: HashMap<String, Arc<PackageMetadata>>,
    fetches: AtomicUsize,
}

impl StaticRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Add (or replace) a package
    pub fn with_package(mut self, metadata: PackageMetadata) -> Self {
        self.insert(metadata);
        self
    }

    /// Add (or replace) a package
    pub fn insert(&mut self, metadata: PackageMetadata) {
        self.packages.insert(metadata.name.clone(), Arc::new(metadata));
    }

    /// Parse a JSON object mapping package names to registry documents
    pub fn from_json_str(json: &str) -> RegistryResult<Self> {
        Self::parse_named(json, "registry fixture")
    }

    fn parse_named(json: &str, file: &str) -> RegistryResult<Self> {
        let documents: HashMap<String, PackageMetadataResponse> =
            serde_json::from_str(json).map_err(|e| SprigError::JsonParse {
                file: file.to_string(),
                message: e.to_string(),
            })?;

        let mut registry = Self::new();
        for (name, mut document) in documents {
            if document.name.is_empty() {
                document.name = name;
            }
            registry.insert(document.into());
        }
        Ok(registry)
    }

    /// Load a registry fixture file
    pub async fn from_file(path: &Utf8Path) -> RegistryResult<Self> {
        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| SprigError::io(format!("Failed to read {}", path), e))?;
        Self::parse_named(&content, path.as_str())
    }

    /// Number of packages held
    pub fn package_count(&self) -> usize {
        self.packages.len()
    }

    /// Number of fetches served so far
    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::Relaxed)
    }
}

impl RegistrySource for StaticRegistry {
    async fn fetch_metadata(&self, name: &str) -> RegistryResult<Arc<PackageMetadata>> {
        self.fetches.fetch_add(1, Ordering::Relaxed);
        self.packages
            .get(name)
            .cloned()
            .ok_or_else(|| SprigError::PackageNotFound {
                name: name.to_string(),
            })
    }
}
