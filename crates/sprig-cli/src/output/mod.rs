//! Terminal output formatting and utilities.
//!
//! Command results go to stdout; status lines and errors go to stderr so that
//! `--json` output can be piped.

pub mod colors;
pub mod errors;
pub mod tree;

/// Output handler for consistent terminal formatting
pub struct OutputHandler {
    colors: colors::ColorSupport,
}

impl OutputHandler {
    /// Create an output handler with explicit color support
    pub fn with_colors(colors: colors::ColorSupport) -> Self {
        Self { colors }
    }

    pub fn colors(&self) -> &colors::ColorSupport {
        &self.colors
    }

    /// Print a command result
    pub fn print(&self, text: &str) {
        println!("{}", text);
    }

    /// Print an info message
    pub fn info(&self, message: &str) {
        eprintln!("{}", self.colors.dim(message));
    }

    /// Print a warning message
    pub fn warn(&self, message: &str) {
        eprintln!("{} {}", self.colors.yellow("⚠"), message);
    }
}
