//! Core data types for sprig.
//!
//! This module provides the fundamental types used throughout the workspace:
//! - Versions and the pre-release aware comparator
//! - Range expressions and matching
//! - Package metadata snapshots
//! - Resolved dependency tree nodes

pub mod dependency;
pub mod package;
pub mod range;
pub mod version;

// Re-export all public types
pub use dependency::{DependencyMap, DependencyNode, ResolvedTree};
pub use package::{PackageMetadata, VersionInfo, LATEST_TAG};
pub use range::{Clause, Component, Op, PartialVersion, RangeExpression};
pub use version::{Prerelease, PrereleaseRanking, Sequence, Version, VersionComparator};
