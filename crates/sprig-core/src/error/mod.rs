//! Error types and result aliases for sprig operations.
//!
//! Provides a unified error type covering version parsing, range matching,
//! registry access, tree resolution and configuration.

use thiserror::Error;

/// Unified error type for all sprig operations
#[derive(Error, Debug)]
pub enum SprigError {
    // Version and range errors
    #[error("Malformed version '{input}': {reason}")]
    MalformedVersion { input: String, reason: String },

    #[error("Malformed range '{range}': {reason}")]
    MalformedRange { range: String, reason: String },

    // Resolution errors
    #[error("No published version of '{package}' satisfies '{range}'")]
    UnsatisfiableRange { package: String, range: String },

    #[error("Circular dependency detected: {}", .cycle.join(" -> "))]
    CycleDetected { cycle: Vec<String> },

    #[error("Resolution of '{package}' was aborted: {message}")]
    ResolutionAborted { package: String, message: String },

    // Registry errors
    #[error("Package '{name}' not found in registry")]
    PackageNotFound { name: String },

    #[error("Version '{version}' of package '{name}' is not published")]
    VersionNotFound { name: String, version: String },

    #[error("Registry unavailable: {message}")]
    RegistryUnavailable {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    // Config errors
    #[error("Failed to parse {file}: {message} at line {line}, column {column}")]
    TomlParse {
        file: String,
        message: String,
        line: usize,
        column: usize,
    },

    #[error("Failed to parse {file}: {message}")]
    JsonParse { file: String, message: String },

    #[error("Failed to serialize {what}: {message}")]
    Serialization { what: String, message: String },

    #[error("Configuration field '{field}' is invalid: {reason}")]
    ConfigValidation { field: String, reason: String },

    // IO errors
    #[error("IO error: {message}")]
    Io {
        message: String,
        #[source]
        source: std::io::Error,
    },
}

/// Result type alias for sprig operations
pub type SprigResult<T> = Result<T, SprigError>;

impl SprigError {
    /// Create a registry error from any error type
    pub fn registry<E>(message: String, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::RegistryUnavailable {
            message,
            source: Some(Box::new(source)),
        }
    }

    /// Create an IO error from std::io::Error
    pub fn io(message: String, source: std::io::Error) -> Self {
        Self::Io { message, source }
    }

    /// Check if this error is worth retrying
    pub fn is_recoverable(&self) -> bool {
        matches!(self, SprigError::RegistryUnavailable { .. })
    }

    /// Get a user-friendly suggestion for fixing this error
    pub fn suggestion(&self) -> Option<&'static str> {
        match self {
            SprigError::PackageNotFound { .. } => {
                Some("Check the package name spelling or the configured registry URL")
            },
            SprigError::VersionNotFound { .. } => {
                Some("Pass a concrete version that the registry lists for this package")
            },
            SprigError::RegistryUnavailable { .. } => {
                Some("Check your internet connection or raise [registry] timeout-secs")
            },
            SprigError::UnsatisfiableRange { .. } => {
                Some("The declared range excludes every published version of the dependency")
            },
            SprigError::MalformedRange { .. } => {
                Some("Only exact, ^, ~, x/* wildcard and '||' ranges are understood")
            },
            SprigError::CycleDetected { .. } => {
                Some("The registry metadata describes packages that require each other")
            },
            SprigError::TomlParse { .. } | SprigError::ConfigValidation { .. } => {
                Some("Fix sprig.toml or remove the offending key")
            },
            _ => None,
        }
    }
}
