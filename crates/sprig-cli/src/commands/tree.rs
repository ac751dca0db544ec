//! Tree command implementation.
//!
//! Resolves a published package version and prints its dependency tree.

use std::time::{Duration, Instant};

use sprig_core::error::{SprigError, SprigResult};
use sprig_core::types::ResolvedTree;
use sprig_registry::RegistrySource;
use sprig_resolver::TreeBuilder;
use tracing::debug;

use super::CommandContext;
use crate::output::tree::render_tree;
use crate::RegistryArgs;

/// Execute the tree command
pub async fn execute(
    name: &str,
    version: &str,
    json: bool,
    registry: &RegistryArgs,
    ctx: &CommandContext,
) -> SprigResult<()> {
    let builder = super::tree_builder(ctx, registry).await?;

    let start = Instant::now();
    let tree = resolve(&builder, name, version).await?;
    let elapsed = start.elapsed();

    if let Some(stats) = builder.registry().cache_stats() {
        debug!("Metadata cache: {} fresh of {} entries", stats.fresh_entries, stats.total_entries);
    }

    ctx.output.print(&format_tree(&tree, json, ctx)?);
    if !json {
        ctx.output.info(&summary(&tree, elapsed));
    }
    Ok(())
}

/// One-line size report printed under a text tree
pub fn summary(tree: &ResolvedTree, elapsed: Duration) -> String {
    format!(
        "{} packages, {} levels deep, resolved in {:.2}s",
        tree.node_count(),
        tree.depth(),
        elapsed.as_secs_f64()
    )
}

/// Resolve `name@version` against any registry source
pub async fn resolve<R>(builder: &TreeBuilder<R>, name: &str, version: &str) -> SprigResult<ResolvedTree>
where
    R: RegistrySource + 'static,
{
    builder.resolve_package(name, version).await
}

/// Text or JSON rendering of a resolved tree
pub fn format_tree(tree: &ResolvedTree, json: bool, ctx: &CommandContext) -> SprigResult<String> {
    if json {
        serde_json::to_string_pretty(tree).map_err(|e| SprigError::Serialization {
            what: "dependency tree".to_string(),
            message: e.to_string(),
        })
    } else {
        let root = format!("{}@{}", tree.name, tree.version);
        Ok(render_tree(&root, &tree.dependencies, ctx.output.colors()))
    }
}
