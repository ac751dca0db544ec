//! Dependency resolution performance benchmarks
//!
//! Covers the comparator, range matching, per-package version selection and
//! full tree resolution against an in-memory registry.

use std::collections::BTreeMap;
use std::sync::Arc;

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use sprig_benchmarks::{criterion_config, package_name, synthetic_registry, version_strings};
use sprig_core::types::{PackageMetadata, RangeExpression, Version, VersionComparator, VersionInfo};
use sprig_resolver::{ResolveOptions, TreeBuilder, VersionSelector};

/// Benchmark finding the highest of a version list
fn bench_version_comparison(c: &mut Criterion) {
    let mut group = c.benchmark_group("version_comparison");
    let comparator = VersionComparator::default();

    for count in [10, 100, 1000] {
        let versions: Vec<Version> = version_strings(count)
            .iter()
            .map(|v| Version::parse(v).unwrap())
            .collect();
        group.throughput(Throughput::Elements(count as u64));

        group.bench_with_input(BenchmarkId::new("max_of", count), &versions, |b, versions| {
            b.iter(|| black_box(comparator.max_of(versions.iter())));
        });

        group.bench_with_input(BenchmarkId::new("sort", count), &versions, |b, versions| {
            b.iter(|| {
                let mut sorted = versions.clone();
                sorted.sort_by(|a, b| comparator.compare(a, b));
                black_box(sorted)
            });
        });
    }

    group.finish();
}

/// Benchmark matching ranges against a version list
fn bench_range_matching(c: &mut Criterion) {
    let mut group = c.benchmark_group("range_matching");
    let versions: Vec<Version> = version_strings(500)
        .iter()
        .map(|v| Version::parse(v).unwrap())
        .collect();
    group.throughput(Throughput::Elements(versions.len() as u64));

    for range in ["1.2.3", "^1.2.0", "~2.3.0", "3.x", "^0.1.0 || ^1.0.0 || 2.x"] {
        let expression = RangeExpression::parse(range).unwrap();
        group.bench_with_input(BenchmarkId::new("range", range), &expression, |b, expression| {
            b.iter(|| black_box(versions.iter().filter(|v| expression.is_satisfied_by(v)).count()));
        });
    }

    group.finish();
}

/// Benchmark picking the highest satisfying published version
fn bench_version_selection(c: &mut Criterion) {
    let mut group = c.benchmark_group("version_selection");
    let comparator = VersionComparator::default();
    let range = RangeExpression::parse("^1.0.0 || ^2.0.0").unwrap();

    for count in [10, 100, 1000] {
        let metadata = version_strings(count)
            .iter()
            .fold(PackageMetadata::new("bench".to_string()), |metadata, version| {
                metadata.with_version(version, VersionInfo::default())
            });
        group.throughput(Throughput::Elements(count as u64));

        group.bench_with_input(BenchmarkId::new("versions", count), &metadata, |b, metadata| {
            b.iter(|| {
                let selector = VersionSelector::new(metadata);
                black_box(selector.select(&range, &comparator).map(str::to_string))
            });
        });
    }

    group.finish();
}

/// Benchmark resolving complete trees of different sizes
fn bench_tree_resolution(c: &mut Criterion) {
    let mut group = c.benchmark_group("tree_resolution");
    group.sample_size(20);
    let runtime = tokio::runtime::Runtime::new().unwrap();

    for packages in [10, 50, 200] {
        let registry = Arc::new(synthetic_registry(packages, 20, 3));
        let mut root = BTreeMap::new();
        root.insert(package_name(0), "^1.0.0".to_string());
        group.throughput(Throughput::Elements(packages as u64));

        for permits in [1, 8] {
            let options = ResolveOptions {
                max_concurrent_fetches: permits,
                ..ResolveOptions::default()
            };
            group.bench_with_input(
                BenchmarkId::new(format!("permits_{}", permits), packages),
                &root,
                |b, root| {
                    b.iter(|| {
                        // Fresh builder so the subtree cache starts empty
                        let builder = TreeBuilder::with_options(Arc::clone(&registry), options.clone());
                        black_box(runtime.block_on(builder.resolve(root)).unwrap())
                    });
                },
            );
        }
    }

    group.finish();
}

criterion_group! {
    name = benches;
    config = criterion_config();
    targets = bench_version_comparison, bench_range_matching, bench_version_selection, bench_tree_resolution
}
criterion_main!(benches);
