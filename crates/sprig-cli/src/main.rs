//! # sprig
//!
//! Resolves the transitive dependency tree of npm packages.
//!
//! This is the main entry point for the sprig CLI tool. It handles command parsing,
//! sets up logging and error handling, and dispatches to the appropriate command handlers.

use std::process::ExitCode;

use camino::Utf8PathBuf;
use clap::{Args, Parser, Subcommand};
use sprig_core::error::{SprigError, SprigResult};
use tracing::{debug, error};
use tracing_subscriber::EnvFilter;

mod commands;
mod output;

use commands::CommandContext;
use output::colors::ColorSupport;
use output::errors::ErrorFormatter;

const LONG_VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    " (built ",
    env!("BUILD_DATE"),
    ", ",
    env!("RUSTC_VERSION"),
    ")"
);

/// Resolve npm dependency trees
#[derive(Debug, Parser)]
#[command(name = "sprig", version, long_version = LONG_VERSION, about = "Resolve npm dependency trees")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Resolve the dependency tree of a published package version
    Tree {
        /// Package name, e.g. react or @types/node
        name: String,
        /// Exact published version
        version: String,
        #[command(flatten)]
        output: OutputArgs,
        #[command(flatten)]
        registry: RegistryArgs,
    },
    /// Resolve the dependencies of the nearest package.json
    Deps {
        /// Include devDependencies
        #[arg(long)]
        dev: bool,
        #[command(flatten)]
        output: OutputArgs,
        #[command(flatten)]
        registry: RegistryArgs,
    },
    /// Check whether a version satisfies a range
    Satisfies {
        /// Range expression, e.g. "^16.4.0 || 17.x"
        range: String,
        /// Concrete version
        version: String,
    },
    /// Compare two versions
    Compare { a: String, b: String },
}

/// Output format flags
#[derive(Debug, Clone, Default, Args)]
pub struct OutputArgs {
    /// Print the tree as a JSON document
    #[arg(long)]
    pub json: bool,
}

/// Registry selection flags
#[derive(Debug, Clone, Default, Args)]
pub struct RegistryArgs {
    /// Registry base URL
    #[arg(long, value_name = "URL")]
    pub registry: Option<String>,

    /// Resolve against a JSON file of registry documents instead of the network
    #[arg(long, value_name = "FILE")]
    pub offline_fixtures: Option<Utf8PathBuf>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    setup_logging(cli.verbose);
    setup_panic_handler();

    debug!("Starting sprig v{}", env!("CARGO_PKG_VERSION"));

    let colors = if cli.no_color {
        ColorSupport::disabled()
    } else {
        ColorSupport::detect()
    };

    match run_cli(cli, colors) {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            eprint!("{}", ErrorFormatter::with_colors(colors).format_error(&error));
            ExitCode::FAILURE
        },
    }
}

fn run_cli(cli: Cli, colors: ColorSupport) -> SprigResult<()> {
    // Create Tokio runtime for async operations
    let rt = tokio::runtime::Runtime::new()
        .map_err(|e| SprigError::io("Failed to create async runtime".to_string(), e))?;

    rt.block_on(async {
        let ctx = CommandContext::new(colors)?;
        commands::dispatch_command(cli.command, &ctx).await
    })
}

fn setup_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "sprig={level},sprig_core={level},sprig_registry={level},sprig_resolver={level},sprig_config={level}",
            level = level
        ))
    });

    // Logs go to stderr so that stdout stays machine readable
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn setup_panic_handler() {
    std::panic::set_hook(Box::new(|panic_info| {
        error!("sprig encountered an unexpected error: {}", panic_info);
        eprintln!("sprig crashed! This is a bug.");
        eprintln!("Please report this at: https://github.com/sprig-pm/sprig/issues");
        eprintln!("Error: {}", panic_info);
    }));
}
