//! sprig benchmarking suite
//!
//! Benchmarks for version comparison, range matching, manifest parsing and
//! tree resolution.

pub mod common;

pub use common::*;
