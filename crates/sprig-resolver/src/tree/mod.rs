//! Recursive dependency tree builder
//!
//! Resolves a map of declared dependency ranges into a tree of
//! [`DependencyNode`]s. Siblings are resolved concurrently on the tokio runtime,
//! registry fetches are bounded by a semaphore, and every branch carries the
//! ordered set of `(name, range)` entries it is currently resolving so that a
//! cycle fails with `CycleDetected` instead of recursing forever.

use std::collections::BTreeMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Instant;

use dashmap::DashMap;
use indexmap::IndexSet;
use sprig_core::error::SprigError;
use sprig_core::types::{
    DependencyMap, DependencyNode, PackageMetadata, PrereleaseRanking, RangeExpression, ResolvedTree,
    VersionComparator,
};
use sprig_registry::RegistrySource;
use tokio::sync::{OnceCell, Semaphore};
use tokio::task::JoinSet;
use tracing::{debug, info};

use crate::semver::VersionSelector;
use crate::ResolverResult;

/// Default bound on in-flight registry fetches
pub const DEFAULT_MAX_CONCURRENT_FETCHES: usize = 8;

/// `(package name, declared range)` entries being resolved on one branch
type ActivePath = IndexSet<(String, String)>;

type BoxedResolve = Pin<Box<dyn Future<Output = ResolverResult<DependencyMap>> + Send>>;

/// Resolution settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolveOptions {
    /// Maximum number of registry fetches in flight
    pub max_concurrent_fetches: usize,
    /// Pre-release identifier order used when picking the highest candidate
    pub ranking: PrereleaseRanking,
}

impl Default for ResolveOptions {
    fn default() -> Self {
        Self {
            max_concurrent_fetches: DEFAULT_MAX_CONCURRENT_FETCHES,
            ranking: PrereleaseRanking::default(),
        }
    }
}

struct BuilderState<R> {
    registry: R,
    comparator: VersionComparator,
    fetch_permits: Semaphore,
    /// Metadata per package name; concurrent lookups of one name share a fetch
    metadata: DashMap<String, Arc<OnceCell<Arc<PackageMetadata>>>>,
    /// Resolved children keyed by `(name, resolved version)`
    subtrees: DashMap<(String, String), DependencyMap>,
}

/// Builds dependency trees against a registry source.
///
/// Cloning is cheap; clones share the registry, the fetch limit, fetched
/// metadata and resolved subtrees. Create one builder per resolution request.
pub struct TreeBuilder<R> {
    state: Arc<BuilderState<R>>,
}

impl<R> Clone for TreeBuilder<R> {
    fn clone(&self) -> Self {
        Self {
            state: Arc::clone(&self.state),
        }
    }
}

impl<R: RegistrySource + 'static> TreeBuilder<R> {
    /// Create a builder with default options
    pub fn new(registry: R) -> Self {
        Self::with_options(registry, ResolveOptions::default())
    }

    pub fn with_options(registry: R, options: ResolveOptions) -> Self {
        Self {
            state: Arc::new(BuilderState {
                registry,
                comparator: VersionComparator::new(options.ranking),
                fetch_permits: Semaphore::new(options.max_concurrent_fetches.max(1)),
                metadata: DashMap::new(),
                subtrees: DashMap::new(),
            }),
        }
    }

    /// The registry source resolution reads from
    pub fn registry(&self) -> &R {
        &self.state.registry
    }

    /// Resolve a published package version and everything it depends on
    pub async fn resolve_package(&self, name: &str, version: &str) -> ResolverResult<ResolvedTree> {
        let metadata = self.fetch(name).await?;
        let info = metadata.version(version).ok_or_else(|| SprigError::VersionNotFound {
            name: name.to_string(),
            version: version.to_string(),
        })?;

        let dependencies = self.resolve(&info.dependencies).await?;
        Ok(ResolvedTree::new(name.to_string(), version.to_string(), dependencies))
    }

    /// Resolve a map of dependency name to declared range
    pub async fn resolve(&self, dependencies: &BTreeMap<String, String>) -> ResolverResult<DependencyMap> {
        let start = Instant::now();
        let resolved = self
            .resolve_map(dependencies.clone(), Arc::new(ActivePath::new()))
            .await?;

        info!(
            "Resolved {} packages in {:.2?}",
            resolved.values().map(DependencyNode::node_count).sum::<usize>(),
            start.elapsed()
        );
        Ok(resolved)
    }

    /// Resolve siblings concurrently and merge them by name
    fn resolve_map(&self, dependencies: BTreeMap<String, String>, path: Arc<ActivePath>) -> BoxedResolve {
        let builder = self.clone();

        Box::pin(async move {
            let mut tasks = JoinSet::new();
            for (name, range) in dependencies {
                let builder = builder.clone();
                let path = Arc::clone(&path);
                tasks.spawn(async move {
                    let result = builder.resolve_entry(&name, range, &path).await;
                    (name, result)
                });
            }

            let mut resolved = DependencyMap::new();
            let mut failures = BTreeMap::new();
            while let Some(joined) = tasks.join_next().await {
                match joined {
                    Ok((name, Ok(node))) => {
                        resolved.insert(name, node);
                    },
                    Ok((name, Err(error))) => {
                        failures.insert(name, error);
                    },
                    Err(error) => {
                        let parent = path.last().map(|(name, _)| name.as_str()).unwrap_or("root");
                        return Err(SprigError::ResolutionAborted {
                            package: parent.to_string(),
                            message: error.to_string(),
                        });
                    },
                }
            }

            // Lowest failing name wins so the reported error does not depend on scheduling
            match failures.into_iter().next() {
                Some((_, error)) => Err(error),
                None => Ok(resolved),
            }
        })
    }

    async fn resolve_entry(&self, name: &str, range_text: String, path: &ActivePath) -> ResolverResult<DependencyNode> {
        let key = (name.to_string(), range_text);
        if let Some(start) = path.get_index_of(&key) {
            let mut cycle: Vec<String> = path.iter().skip(start).map(|(name, _)| name.clone()).collect();
            cycle.push(name.to_string());
            return Err(SprigError::CycleDetected { cycle });
        }

        let range = RangeExpression::parse(&key.1)?;
        let metadata = self.fetch(name).await?;
        let version = VersionSelector::new(&metadata)
            .select(&range, &self.state.comparator)
            .map(str::to_string)
            .ok_or_else(|| SprigError::UnsatisfiableRange {
                package: name.to_string(),
                range: key.1.clone(),
            })?;
        debug!("{}@{} resolved to {}", name, range, version);

        let children = self.resolve_children(&metadata, &version, path, &key).await?;
        let (name, range_text) = key;
        Ok(DependencyNode::new(name, range_text, version, children))
    }

    async fn resolve_children(
        &self,
        metadata: &PackageMetadata,
        version: &str,
        path: &ActivePath,
        key: &(String, String),
    ) -> ResolverResult<DependencyMap> {
        let declared = match metadata.version(version) {
            Some(info) if info.has_dependencies() => info.dependencies.clone(),
            _ => return Ok(DependencyMap::new()),
        };

        let subtree_key = (key.0.clone(), version.to_string());
        let cached = self.state.subtrees.get(&subtree_key).map(|entry| entry.value().clone());
        if let Some(children) = cached {
            return Ok(children);
        }

        let mut branch = path.clone();
        branch.insert(key.clone());
        let children = self.resolve_map(declared, Arc::new(branch)).await?;
        self.state.subtrees.insert(subtree_key, children.clone());
        Ok(children)
    }

    /// Metadata of `name`, fetched at most once per builder.
    ///
    /// A failed fetch leaves the slot empty, so a later lookup tries again.
    async fn fetch(&self, name: &str) -> ResolverResult<Arc<PackageMetadata>> {
        let slot = Arc::clone(self.state.metadata.entry(name.to_string()).or_default().value());

        let metadata = slot
            .get_or_try_init(|| async {
                let _permit = self
                    .state
                    .fetch_permits
                    .acquire()
                    .await
                    .map_err(|e| SprigError::ResolutionAborted {
                        package: name.to_string(),
                        message: e.to_string(),
                    })?;
                debug!("Fetching metadata of {}", name);
                self.state.registry.fetch_metadata(name).await
            })
            .await?;
        Ok(Arc::clone(metadata))
    }
}
