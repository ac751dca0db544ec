//! Command implementations and dispatch logic.
//!
//! Each command is an async function taking a [`CommandContext`]. The helpers
//! here turn layered configuration into a registry source and resolver options.

use std::sync::Arc;

use camino::Utf8PathBuf;
use sprig_config::{ConfigLoader, ConfigOverrides, Settings};
use sprig_core::error::{SprigError, SprigResult};
use sprig_core::types::{PackageMetadata, PrereleaseRanking};
use sprig_registry::{
    AuthConfig, CacheStats, CachedRegistry, ClientOptions, MetadataCache, RegistryClient, RegistryResult, RegistrySource,
    RetryConfig, StaticRegistry,
};
use sprig_resolver::{ResolveOptions, TreeBuilder};
use tracing::{debug, info};

pub mod deps;
pub mod tree;
pub mod version;

#[cfg(test)]
mod tests;

use crate::output::colors::ColorSupport;
use crate::output::OutputHandler;
use crate::{Commands, RegistryArgs};

/// Shared context for all commands
pub struct CommandContext {
    pub cwd: Utf8PathBuf,
    pub output: OutputHandler,
}

impl CommandContext {
    /// Create a context for the process working directory
    pub fn new(colors: ColorSupport) -> SprigResult<Self> {
        let cwd = std::env::current_dir()
            .map_err(|e| SprigError::io("Failed to get current directory".to_string(), e))?;
        let cwd = Utf8PathBuf::try_from(cwd).map_err(|e| {
            SprigError::io("Current directory is not valid UTF-8".to_string(), e.into_io_error())
        })?;

        Ok(Self {
            cwd,
            output: OutputHandler::with_colors(colors),
        })
    }

    /// Configuration loader rooted at the working directory
    pub fn config_loader(&self) -> ConfigLoader {
        ConfigLoader::new(self.cwd.clone())
    }
}

/// Dispatch a command to its handler
pub async fn dispatch_command(command: Commands, ctx: &CommandContext) -> SprigResult<()> {
    match command {
        Commands::Tree {
            name,
            version,
            output,
            registry,
        } => {
            info!("Resolving dependency tree of {}@{}", name, version);
            tree::execute(&name, &version, output.json, &registry, ctx).await
        },
        Commands::Deps { dev, output, registry } => {
            info!("Resolving project dependencies (dev: {})", dev);
            deps::execute(dev, output.json, &registry, ctx).await
        },
        Commands::Satisfies { range, version } => version::execute_satisfies(&range, &version, ctx),
        Commands::Compare { a, b } => {
            let settings = load_settings(ctx, &RegistryArgs::default()).await?;
            version::execute_compare(&a, &b, &ranking(&settings), ctx)
        },
    }
}

/// Load layered settings, with registry flags as the command line layer
pub async fn load_settings(ctx: &CommandContext, args: &RegistryArgs) -> SprigResult<Settings> {
    let overrides = ConfigOverrides {
        registry_url: args.registry.clone(),
        ..ConfigOverrides::default()
    };

    let loaded = ctx.config_loader().load(overrides).await?;
    debug!("Configuration sources: {:?}", loaded.sources);
    Ok(loaded.settings)
}

/// Registry source selected by configuration and flags
pub enum Registry {
    /// HTTP registry behind the metadata cache
    Cached(CachedRegistry<RegistryClient>),
    /// HTTP registry, every fetch goes to the network
    Remote(RegistryClient),
    /// Registry documents read from a local file
    Offline(StaticRegistry),
}

impl Registry {
    /// Build the source for one command invocation
    pub async fn open(settings: &Settings, args: &RegistryArgs) -> SprigResult<Self> {
        if let Some(path) = &args.offline_fixtures {
            debug!("Using offline registry fixtures from {}", path);
            return Ok(Self::Offline(StaticRegistry::from_file(path).await?));
        }

        let client = RegistryClient::with_options(client_options(settings))?;
        if settings.cache_enabled {
            let cache = Arc::new(MetadataCache::with_ttl(settings.cache_ttl));
            Ok(Self::Cached(CachedRegistry::new(client, cache)))
        } else {
            Ok(Self::Remote(client))
        }
    }

    /// Metadata cache occupancy, when the source has a cache
    pub fn cache_stats(&self) -> Option<CacheStats> {
        match self {
            Self::Cached(registry) => Some(registry.cache().stats()),
            Self::Remote(_) | Self::Offline(_) => None,
        }
    }
}

impl RegistrySource for Registry {
    async fn fetch_metadata(&self, name: &str) -> RegistryResult<Arc<PackageMetadata>> {
        match self {
            Self::Cached(registry) => registry.fetch_metadata(name).await,
            Self::Remote(client) => client.fetch_metadata(name).await,
            Self::Offline(registry) => registry.fetch_metadata(name).await,
        }
    }
}

/// HTTP client options from settings
pub fn client_options(settings: &Settings) -> ClientOptions {
    let auth = if settings.token.is_some() || settings.username.is_some() {
        Some(AuthConfig {
            token: settings.token.clone(),
            username: settings.username.clone(),
            password: settings.password.clone(),
        })
    } else {
        None
    };

    ClientOptions {
        base_url: settings.registry_url.clone(),
        timeout: settings.timeout,
        auth,
        retry: RetryConfig {
            max_retries: settings.retry.max_retries,
            initial_delay: settings.retry.initial_delay,
            max_delay: settings.retry.max_delay,
            ..RetryConfig::default()
        },
    }
}

/// Pre-release ranking from settings
pub fn ranking(settings: &Settings) -> PrereleaseRanking {
    PrereleaseRanking::new(settings.prerelease_order.iter().cloned())
}

/// Resolver options from settings
pub fn resolve_options(settings: &Settings) -> ResolveOptions {
    ResolveOptions {
        max_concurrent_fetches: settings.max_concurrent_fetches,
        ranking: ranking(settings),
    }
}

/// Tree builder for one command invocation
pub async fn tree_builder(ctx: &CommandContext, args: &RegistryArgs) -> SprigResult<TreeBuilder<Registry>> {
    let settings = load_settings(ctx, args).await?;
    let registry = Registry::open(&settings, args).await?;
    Ok(TreeBuilder::with_options(registry, resolve_options(&settings)))
}
