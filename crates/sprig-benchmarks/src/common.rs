//! Common utilities for benchmarks

use std::time::Duration;

use criterion::Criterion;
use pprof::criterion::{Output, PProfProfiler};
use sprig_core::types::{PackageMetadata, VersionInfo};
use sprig_registry::StaticRegistry;

/// Configure criterion with flamegraph profiling support
pub fn criterion_config() -> Criterion {
    Criterion::default()
        .warm_up_time(Duration::from_secs(3))
        .measurement_time(Duration::from_secs(10))
        .sample_size(100)
        .with_profiler(PProfProfiler::new(100, Output::Flamegraph(None)))
}

/// `count` published versions: release lines with the odd pre-release mixed in
pub fn version_strings(count: usize) -> Vec<String> {
    (0..count)
        .map(|i| match i % 7 {
            3 => format!("{}.{}.0-beta.{}", i / 50, (i / 7) % 10, i % 5),
            5 => format!("{}.{}.0-rc.{}", i / 50, (i / 7) % 10, i % 3),
            _ => format!("{}.{}.{}", i / 50, (i / 7) % 10, i % 7),
        })
        .collect()
}

/// Name of the `index`th synthetic package
pub fn package_name(index: usize) -> String {
    format!("pkg-{:04}", index)
}

/// Registry of `packages` packages, each publishing `versions` releases.
///
/// Package `i` depends on the next `fan_out` packages, which makes the graph
/// a DAG with heavy sharing and no cycles.
pub fn synthetic_registry(packages: usize, versions: usize, fan_out: usize) -> StaticRegistry {
    let mut registry = StaticRegistry::new();

    for index in 0..packages {
        let dependencies: Vec<(String, String)> = (index + 1..packages)
            .take(fan_out)
            .map(|dep| (package_name(dep), "^1.0.0".to_string()))
            .collect();

        let mut metadata = PackageMetadata::new(package_name(index));
        for minor in 0..versions {
            let version = format!("1.{}.0", minor);
            metadata = metadata.with_version(&version, VersionInfo::with_dependencies(dependencies.clone()));
        }
        registry.insert(metadata);
    }

    registry
}
