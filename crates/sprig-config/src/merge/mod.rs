//! Configuration layering, fallback logic, and environment overrides
//!
//! Layers, lowest priority first: built-in defaults, `~/.sprig/config.toml`,
//! the nearest `sprig.toml` above the working directory, `SPRIG_*`
//! environment variables, command line flags. Layers merge key by key.

use std::time::Duration;

use camino::{Utf8Path, Utf8PathBuf};
use sprig_core::error::SprigError;
use tracing::debug;

use crate::json::PACKAGE_JSON;
use crate::toml::{self as sprig_toml, SprigToml, CONFIG_FILE_NAME};
use crate::ConfigResult;

/// Registry used when no layer names one
pub const DEFAULT_REGISTRY_URL: &str = "https://registry.npmjs.org";

/// Registry URL override
pub const ENV_REGISTRY: &str = "SPRIG_REGISTRY";
/// Registry timeout override, in seconds
pub const ENV_REGISTRY_TIMEOUT: &str = "SPRIG_REGISTRY_TIMEOUT";
/// Registry bearer token
pub const ENV_TOKEN: &str = "SPRIG_TOKEN";

/// Fully resolved settings with defaults applied
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub registry_url: String,
    pub timeout: Duration,
    pub token: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub retry: RetrySettings,
    pub cache_enabled: bool,
    pub cache_ttl: Duration,
    pub max_concurrent_fetches: usize,
    /// Pre-release identifiers, lowest first
    pub prerelease_order: Vec<String>,
}

/// Retry settings for registry requests
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetrySettings {
    pub max_retries: u32,
    pub initial_delay: Duration,
    pub max_delay: Duration,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            registry_url: DEFAULT_REGISTRY_URL.to_string(),
            timeout: Duration::from_secs(30),
            token: None,
            username: None,
            password: None,
            retry: RetrySettings {
                max_retries: 3,
                initial_delay: Duration::from_millis(100),
                max_delay: Duration::from_secs(10),
            },
            cache_enabled: true,
            cache_ttl: Duration::from_secs(3600),
            max_concurrent_fetches: 8,
            prerelease_order: vec!["alpha".to_string(), "beta".to_string(), "rc".to_string()],
        }
    }
}

impl Settings {
    /// Apply a merged configuration over the defaults
    pub fn from_toml(config: &SprigToml) -> ConfigResult<Self> {
        sprig_toml::validate_config(config)?;

        let defaults = Self::default();
        let registry = &config.registry;
        let retry = &registry.retry;

        Ok(Self {
            registry_url: registry.url.clone().unwrap_or(defaults.registry_url),
            timeout: registry
                .timeout_secs
                .map(Duration::from_secs)
                .unwrap_or(defaults.timeout),
            token: registry.token.clone(),
            username: registry.username.clone(),
            password: registry.password.clone(),
            retry: RetrySettings {
                max_retries: retry.max_retries.unwrap_or(defaults.retry.max_retries),
                initial_delay: retry
                    .initial_delay_ms
                    .map(Duration::from_millis)
                    .unwrap_or(defaults.retry.initial_delay),
                max_delay: retry
                    .max_delay_ms
                    .map(Duration::from_millis)
                    .unwrap_or(defaults.retry.max_delay),
            },
            cache_enabled: config.cache.enabled.unwrap_or(defaults.cache_enabled),
            cache_ttl: config
                .cache
                .ttl_secs
                .map(Duration::from_secs)
                .unwrap_or(defaults.cache_ttl),
            max_concurrent_fetches: config
                .resolver
                .max_concurrent_fetches
                .unwrap_or(defaults.max_concurrent_fetches),
            prerelease_order: config
                .resolver
                .prerelease_order
                .clone()
                .unwrap_or(defaults.prerelease_order),
        })
    }
}

/// Where a configuration layer came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    /// Global config file
    Global(Utf8PathBuf),
    /// Project sprig.toml file
    Project(Utf8PathBuf),
    /// Environment variable
    Environment(String),
    /// CLI flag
    CommandLine,
}

/// Values that can be set from the environment or the command line
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigOverrides {
    pub registry_url: Option<String>,
    pub timeout_secs: Option<u64>,
    pub token: Option<String>,
}

impl ConfigOverrides {
    /// Collect `SPRIG_*` overrides from environment variable pairs
    pub fn from_env<I>(vars: I) -> ConfigResult<(Self, Vec<ConfigSource>)>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let mut overrides = Self::default();
        let mut sources = Vec::new();

        for (key, value) in vars {
            match key.as_str() {
                ENV_REGISTRY => overrides.registry_url = Some(value),
                ENV_REGISTRY_TIMEOUT => {
                    let secs = value.trim().parse().map_err(|e| SprigError::ConfigValidation {
                        field: ENV_REGISTRY_TIMEOUT.to_string(),
                        reason: format!("'{}' is not a number of seconds: {}", value, e),
                    })?;
                    overrides.timeout_secs = Some(secs);
                },
                ENV_TOKEN => overrides.token = Some(value),
                _ => continue,
            }
            sources.push(ConfigSource::Environment(key));
        }

        Ok((overrides, sources))
    }

    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }

    /// Express the overrides as a configuration layer
    fn into_layer(self) -> SprigToml {
        let mut layer = SprigToml::default();
        layer.registry.url = self.registry_url;
        layer.registry.timeout_secs = self.timeout_secs;
        layer.registry.token = self.token;
        layer
    }
}

/// Configuration layering and merging
pub struct ConfigLayering;

impl ConfigLayering {
    /// Merge layers given lowest priority first; set keys of later layers win
    pub fn merge_configs<I>(layers: I) -> SprigToml
    where
        I: IntoIterator<Item = SprigToml>,
    {
        layers.into_iter().fold(SprigToml::default(), |mut merged, layer| {
            let registry = layer.registry;
            let retry = registry.retry;
            overlay(&mut merged.registry.url, registry.url);
            overlay(&mut merged.registry.timeout_secs, registry.timeout_secs);
            overlay(&mut merged.registry.token, registry.token);
            overlay(&mut merged.registry.username, registry.username);
            overlay(&mut merged.registry.password, registry.password);
            overlay(&mut merged.registry.retry.max_retries, retry.max_retries);
            overlay(&mut merged.registry.retry.initial_delay_ms, retry.initial_delay_ms);
            overlay(&mut merged.registry.retry.max_delay_ms, retry.max_delay_ms);
            overlay(&mut merged.cache.enabled, layer.cache.enabled);
            overlay(&mut merged.cache.ttl_secs, layer.cache.ttl_secs);
            overlay(&mut merged.resolver.max_concurrent_fetches, layer.resolver.max_concurrent_fetches);
            overlay(&mut merged.resolver.prerelease_order, layer.resolver.prerelease_order);
            merged
        })
    }

    /// Collect environment variable overrides from the process environment
    pub fn collect_env_overrides() -> ConfigResult<(ConfigOverrides, Vec<ConfigSource>)> {
        ConfigOverrides::from_env(std::env::vars())
    }
}

fn overlay<T>(target: &mut Option<T>, value: Option<T>) {
    if value.is_some() {
        *target = value;
    }
}

/// Settings plus the layers that contributed to them
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub settings: Settings,
    pub sources: Vec<ConfigSource>,
}

/// Main configuration loading interface
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    /// Current working directory
    cwd: Utf8PathBuf,
    /// Directory holding `.sprig/config.toml`
    home: Option<Utf8PathBuf>,
}

impl ConfigLoader {
    /// Create a loader for `cwd` using the user's home directory
    pub fn new(cwd: Utf8PathBuf) -> Self {
        let home = dirs::home_dir().and_then(|home| Utf8PathBuf::try_from(home).ok());
        Self { cwd, home }
    }

    /// Create a loader with an explicit home directory
    pub fn with_home(cwd: Utf8PathBuf, home: Option<Utf8PathBuf>) -> Self {
        Self { cwd, home }
    }

    pub fn cwd(&self) -> &Utf8Path {
        &self.cwd
    }

    /// Find a file in the working directory or its ancestors
    pub fn resolve_config_path(&self, filename: &str) -> Option<Utf8PathBuf> {
        self.cwd
            .ancestors()
            .map(|dir| dir.join(filename))
            .find(|candidate| candidate.is_file())
    }

    /// Path of the global configuration file
    pub fn global_config_path(&self) -> Option<Utf8PathBuf> {
        self.home
            .as_ref()
            .map(|home| home.join(".sprig").join("config.toml"))
    }

    /// Load global configuration
    pub async fn load_global_config(&self) -> ConfigResult<Option<(SprigToml, Utf8PathBuf)>> {
        match self.global_config_path() {
            Some(path) if path.is_file() => {
                let config = sprig_toml::load_from_file(&path).await?;
                Ok(Some((config, path)))
            },
            _ => Ok(None),
        }
    }

    /// Load the nearest project sprig.toml
    pub async fn load_project_config(&self) -> ConfigResult<Option<(SprigToml, Utf8PathBuf)>> {
        match self.resolve_config_path(CONFIG_FILE_NAME) {
            Some(path) => {
                let config = sprig_toml::load_from_file(&path).await?;
                Ok(Some((config, path)))
            },
            None => Ok(None),
        }
    }

    /// Nearest package.json above the working directory
    pub fn find_package_json(&self) -> ConfigResult<Utf8PathBuf> {
        self.resolve_config_path(PACKAGE_JSON)
            .ok_or_else(|| SprigError::ConfigValidation {
                field: PACKAGE_JSON.to_string(),
                reason: format!("No package.json found in {} or its parent directories", self.cwd),
            })
    }

    /// Load every layer using the process environment
    pub async fn load(&self, cli: ConfigOverrides) -> ConfigResult<LoadedConfig> {
        let (env, env_sources) = ConfigLayering::collect_env_overrides()?;
        self.load_with(env, env_sources, cli).await
    }

    /// Load every layer with explicit environment overrides
    pub async fn load_with(
        &self,
        env: ConfigOverrides,
        env_sources: Vec<ConfigSource>,
        cli: ConfigOverrides,
    ) -> ConfigResult<LoadedConfig> {
        let mut layers = Vec::new();
        let mut sources = Vec::new();

        if let Some((config, path)) = self.load_global_config().await? {
            debug!("Loaded global configuration from {}", path);
            layers.push(config);
            sources.push(ConfigSource::Global(path));
        }

        if let Some((config, path)) = self.load_project_config().await? {
            debug!("Loaded project configuration from {}", path);
            layers.push(config);
            sources.push(ConfigSource::Project(path));
        }

        layers.push(env.into_layer());
        sources.extend(env_sources);

        if !cli.is_empty() {
            layers.push(cli.into_layer());
            sources.push(ConfigSource::CommandLine);
        }

        let merged = ConfigLayering::merge_configs(layers);
        let settings = Settings::from_toml(&merged)?;
        Ok(LoadedConfig { settings, sources })
    }
}
