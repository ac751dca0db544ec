//! Metadata caching with TTL support

use std::sync::Arc;
use std::time::{Duration, SystemTime};

use dashmap::DashMap;
use sprig_core::types::PackageMetadata;
use tracing::trace;

use crate::source::RegistrySource;
use crate::RegistryResult;

/// Default time-to-live (1 hour)
pub const DEFAULT_TTL: Duration = Duration::from_secs(3600);

/// Cache entry with TTL
#[derive(Debug, Clone)]
pub struct CacheEntry {
    /// Cached metadata
    pub metadata: Arc<PackageMetadata>,
    /// When the entry was stored
    pub stored_at: SystemTime,
    /// Time-to-live duration
    pub ttl: Duration,
}

impl CacheEntry {
    /// Create cache entry with custom TTL
    pub fn with_ttl(metadata: Arc<PackageMetadata>, ttl: Duration) -> Self {
        Self {
            metadata,
            stored_at: SystemTime::now(),
            ttl,
        }
    }

    /// Check if cache entry is still fresh
    pub fn is_fresh(&self) -> bool {
        match self.stored_at.elapsed() {
            Ok(elapsed) => elapsed < self.ttl,
            Err(_) => false, // Clock went backwards, consider stale
        }
    }
}

/// In-memory metadata cache with TTL
#[derive(Debug)]
pub struct MetadataCache {
    cache: DashMap<String, CacheEntry>,
    ttl: Duration,
}

impl MetadataCache {
    /// Create a cache with the default TTL
    pub fn new() -> Self {
        Self::with_ttl(DEFAULT_TTL)
    }

    /// Create a cache whose entries live for `ttl`
    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            cache: DashMap::new(),
            ttl,
        }
    }

    /// Get cached metadata if fresh
    pub fn get(&self, package_name: &str) -> Option<Arc<PackageMetadata>> {
        let fresh = {
            let entry = self.cache.get(package_name)?;
            entry.is_fresh().then(|| Arc::clone(&entry.metadata))
        };

        if fresh.is_none() {
            // Guard above is dropped, removing cannot deadlock the shard
            self.cache.remove(package_name);
        }
        fresh
    }

    /// Store metadata under its package name
    pub fn insert(&self, metadata: Arc<PackageMetadata>) {
        let entry = CacheEntry::with_ttl(metadata, self.ttl);
        self.cache.insert(entry.metadata.name.clone(), entry);
    }

    /// Get cache statistics
    pub fn stats(&self) -> CacheStats {
        let mut fresh_entries = 0;
        let mut stale_entries = 0;

        for entry in self.cache.iter() {
            if entry.is_fresh() {
                fresh_entries += 1;
            } else {
                stale_entries += 1;
            }
        }

        CacheStats {
            total_entries: fresh_entries + stale_entries,
            fresh_entries,
            stale_entries,
        }
    }
}

impl Default for MetadataCache {
    fn default() -> Self {
        Self::new()
    }
}

/// Cache statistics
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheStats {
    /// Total number of entries
    pub total_entries: usize,
    /// Number of fresh entries
    pub fresh_entries: usize,
    /// Number of stale entries
    pub stale_entries: usize,
}

/// Read-through cache in front of another source
#[derive(Debug)]
pub struct CachedRegistry<R> {
    inner: R,
    cache: Arc<MetadataCache>,
}

impl<R: RegistrySource> CachedRegistry<R> {
    pub fn new(inner: R, cache: Arc<MetadataCache>) -> Self {
        Self { inner, cache }
    }

    /// The shared cache
    pub fn cache(&self) -> &Arc<MetadataCache> {
        &self.cache
    }
}

impl<R: RegistrySource> RegistrySource for CachedRegistry<R> {
    async fn fetch_metadata(&self, name: &str) -> RegistryResult<Arc<PackageMetadata>> {
        if let Some(metadata) = self.cache.get(name) {
            trace!("Metadata cache hit for {}", name);
            return Ok(metadata);
        }

        let metadata = self.inner.fetch_metadata(name).await?;
        self.cache.insert(Arc::clone(&metadata));
        Ok(metadata)
    }
}
