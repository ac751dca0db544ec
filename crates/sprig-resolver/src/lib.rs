//! Dependency tree resolution for sprig
//!
//! This crate turns a map of declared dependency ranges into a fully resolved,
//! name-ordered tree: every range is matched against the published versions of
//! its package, the highest candidate wins, and resolution recurses into the
//! winner's own dependencies with cycle detection.

pub mod semver;
pub mod tree;

// Re-export main types
pub use semver::VersionSelector;
pub use tree::{ResolveOptions, TreeBuilder, DEFAULT_MAX_CONCURRENT_FETCHES};

use sprig_core::error::SprigError;

/// Result type for resolver operations
pub type ResolverResult<T> = Result<T, SprigError>;
