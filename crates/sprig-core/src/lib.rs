//! # sprig-core
//!
//! Core types shared across all sprig crates.
//!
//! This crate provides:
//! - `Version` and the `VersionComparator` total order
//! - `RangeExpression` matching (exact, caret, tilde, wildcard, `||`)
//! - `PackageMetadata` / `VersionInfo` registry snapshots
//! - `DependencyNode` / `ResolvedTree` resolution output
//! - `SprigError` for unified error handling

pub mod error;
pub mod types;

// Re-export commonly used types
pub use error::{SprigError, SprigResult};
pub use types::{
    DependencyMap, DependencyNode, PackageMetadata, PrereleaseRanking, RangeExpression,
    ResolvedTree, Version, VersionComparator, VersionInfo,
};
