//! Deps command implementation.
//!
//! Reads the nearest package.json and resolves its declared dependencies.

use sprig_config::json::{self as package_json, PackageJson};
use sprig_core::error::{SprigError, SprigResult};
use sprig_core::types::DependencyMap;
use sprig_registry::RegistrySource;
use sprig_resolver::TreeBuilder;
use tracing::info;

use super::CommandContext;
use crate::output::tree::render_tree;
use crate::RegistryArgs;

/// Execute the deps command
pub async fn execute(dev: bool, json: bool, registry: &RegistryArgs, ctx: &CommandContext) -> SprigResult<()> {
    let path = ctx.config_loader().find_package_json()?;
    info!("Reading {}", path);
    let package = package_json::load_from_file(&path).await?;
    if package.dependencies_to_resolve(dev).is_empty() {
        ctx.output.warn(&format!("{} declares no dependencies", package.display_name()));
    }

    let builder = super::tree_builder(ctx, registry).await?;
    let resolved = resolve(&builder, &package, dev).await?;

    let rendered = if json {
        let document = serde_json::json!({
            "name": package.name,
            "version": package.version,
            "dependencies": resolved,
        });
        serde_json::to_string_pretty(&document).map_err(|e| SprigError::Serialization {
            what: "dependency tree".to_string(),
            message: e.to_string(),
        })?
    } else {
        render_tree(&package.display_name(), &resolved, ctx.output.colors())
    };

    ctx.output.print(&rendered);
    Ok(())
}

/// Resolve a manifest's dependencies against any registry source
pub async fn resolve<R>(builder: &TreeBuilder<R>, package: &PackageJson, dev: bool) -> SprigResult<DependencyMap>
where
    R: RegistrySource + 'static,
{
    builder.resolve(&package.dependencies_to_resolve(dev)).await
}
