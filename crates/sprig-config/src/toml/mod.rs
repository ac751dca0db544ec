//! sprig.toml configuration parsing and serialization

use std::ops::Range;

use camino::Utf8Path;
use serde::{Deserialize, Serialize};
use sprig_core::error::SprigError;

use crate::ConfigResult;

/// Name of the project configuration file
pub const CONFIG_FILE_NAME: &str = "sprig.toml";

/// Complete sprig.toml configuration.
///
/// Every value is optional so that layers can be merged key by key; unset
/// keys fall back to the built-in defaults in [`crate::Settings`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SprigToml {
    /// Registry access
    pub registry: RegistrySection,

    /// Metadata cache
    pub cache: CacheSection,

    /// Tree resolution
    pub resolver: ResolverSection,
}

/// `[registry]` section
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields, rename_all = "kebab-case")]
pub struct RegistrySection {
    /// Registry base URL
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    /// Request timeout in seconds
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,

    /// Bearer token
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,

    /// Basic auth username
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,

    /// Basic auth password
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,

    /// Retry behaviour
    pub retry: RetrySection,
}

/// `[registry.retry]` section
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields, rename_all = "kebab-case")]
pub struct RetrySection {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_retries: Option<u32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub initial_delay_ms: Option<u64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_delay_ms: Option<u64>,
}

/// `[cache]` section
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields, rename_all = "kebab-case")]
pub struct CacheSection {
    /// Whether registry metadata is cached in memory
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,

    /// Cache entry lifetime in seconds
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ttl_secs: Option<u64>,
}

/// `[resolver]` section
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields, rename_all = "kebab-case")]
pub struct ResolverSection {
    /// Bound on in-flight registry fetches
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_concurrent_fetches: Option<usize>,

    /// Pre-release identifiers, lowest first
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prerelease_order: Option<Vec<String>>,
}

/// Parse TOML string to SprigToml configuration
pub fn parse_sprig_toml(content: &str) -> ConfigResult<SprigToml> {
    parse_named(content, CONFIG_FILE_NAME)
}

/// Parse TOML text, naming `file` in errors
pub fn parse_named(content: &str, file: &str) -> ConfigResult<SprigToml> {
    // First pass with toml_edit for precise syntax error locations
    content
        .parse::<toml_edit::DocumentMut>()
        .map_err(|e| toml_error(content, file, e.message(), e.span()))?;

    // Then parse with serde for type safety
    let config: SprigToml =
        toml::from_str(content).map_err(|e| toml_error(content, file, e.message(), e.span()))?;

    validate_config(&config)?;
    Ok(config)
}

/// Serialize SprigToml to TOML string
pub fn serialize_sprig_toml(config: &SprigToml) -> ConfigResult<String> {
    toml::to_string_pretty(config).map_err(|e| SprigError::ConfigValidation {
        field: CONFIG_FILE_NAME.to_string(),
        reason: format!("TOML serialization error: {}", e),
    })
}

/// Validate value ranges the type system does not capture
pub fn validate_config(config: &SprigToml) -> ConfigResult<()> {
    if let Some(url) = &config.registry.url {
        url::Url::parse(url).map_err(|e| SprigError::ConfigValidation {
            field: "registry.url".to_string(),
            reason: format!("'{}' is not a valid URL: {}", url, e),
        })?;
    }

    if config.registry.timeout_secs == Some(0) {
        return Err(invalid("registry.timeout-secs", "must be greater than zero"));
    }

    let retry = &config.registry.retry;
    if let (Some(initial), Some(max)) = (retry.initial_delay_ms, retry.max_delay_ms) {
        if initial > max {
            return Err(invalid(
                "registry.retry.initial-delay-ms",
                "must not exceed registry.retry.max-delay-ms",
            ));
        }
    }

    if config.resolver.max_concurrent_fetches == Some(0) {
        return Err(invalid("resolver.max-concurrent-fetches", "must be greater than zero"));
    }

    if let Some(order) = &config.resolver.prerelease_order {
        for identifier in order {
            // Identifiers are the alphabetic head of a pre-release tag
            if identifier.is_empty() || !identifier.chars().all(|c| c.is_ascii_alphabetic()) {
                return Err(SprigError::ConfigValidation {
                    field: "resolver.prerelease-order".to_string(),
                    reason: format!("'{}' is not an alphabetic pre-release identifier", identifier),
                });
            }
        }
    }

    Ok(())
}

/// Load and parse sprig.toml from file path
pub async fn load_from_file(path: &Utf8Path) -> ConfigResult<SprigToml> {
    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| SprigError::io(format!("Failed to read {}", path), e))?;

    parse_named(&content, path.as_str())
}

fn invalid(field: &str, reason: &str) -> SprigError {
    SprigError::ConfigValidation {
        field: field.to_string(),
        reason: reason.to_string(),
    }
}

fn toml_error(content: &str, file: &str, message: &str, span: Option<Range<usize>>) -> SprigError {
    let (line, column) = span
        .map(|span| line_column(content, span.start))
        .unwrap_or((1, 1));

    SprigError::TomlParse {
        file: file.to_string(),
        message: message.trim().to_string(),
        line,
        column,
    }
}

/// 1-based line and column of a byte offset
fn line_column(content: &str, offset: usize) -> (usize, usize) {
    let before = content.get(..offset).unwrap_or(content);
    let line = before.matches('\n').count() + 1;
    let column = before
        .rfind('\n')
        .map_or(before.chars().count(), |newline| before[newline + 1..].chars().count())
        + 1;
    (line, column)
}
