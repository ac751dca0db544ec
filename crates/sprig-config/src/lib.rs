//! Configuration loading for sprig
//!
//! This crate parses `sprig.toml` and `package.json`, and layers the global
//! file, the project file, environment variables and command line flags into
//! one [`Settings`] value.

pub mod json;
pub mod merge;
pub mod toml;

// Re-export main types
pub use self::json::{PackageJson, PACKAGE_JSON};
pub use self::merge::{
    ConfigLayering, ConfigLoader, ConfigOverrides, ConfigSource, LoadedConfig, RetrySettings, Settings,
    DEFAULT_REGISTRY_URL,
};
pub use self::toml::{SprigToml, CONFIG_FILE_NAME};

use sprig_core::error::SprigError;

/// Result type for configuration operations
pub type ConfigResult<T> = Result<T, SprigError>;
