//! npm registry access for sprig
//!
//! This crate provides the [`RegistrySource`] seam the resolver fetches package
//! metadata through, an HTTP implementation with retry logic, a read-through
//! TTL cache and an in-memory source for fixtures.

pub mod api;
pub mod cache;
pub mod client;
pub mod source;

// Re-export main types
pub use api::{PackageMetadataResponse, VersionMetadata};
pub use cache::{CacheEntry, CacheStats, CachedRegistry, MetadataCache};
pub use client::{AuthConfig, ClientOptions, RegistryClient, RetryConfig, DEFAULT_REGISTRY};
pub use source::{RegistrySource, StaticRegistry};

use sprig_core::error::SprigError;

/// Result type for registry operations
pub type RegistryResult<T> = Result<T, SprigError>;
