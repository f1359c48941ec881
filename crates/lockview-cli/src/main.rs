//! # lockview
//!
//! Inspect npm projects from the terminal: latest registry versions, outdated
//! dependencies and the installed dependency tree.
//!
//! This is the main entry point for the lockview CLI tool. It handles command
//! parsing, sets up logging and error handling, and dispatches to the
//! appropriate command handlers.

use std::path::PathBuf;
use std::process::ExitCode;

use camino::Utf8PathBuf;
use clap::{Args, Parser, Subcommand};
use tracing::{debug, error};
use tracing_subscriber::EnvFilter;

use lockview_config::SettingsLayer;
use lockview_core::error::{LockviewError, LockviewResult};

mod commands;
mod output;

use commands::CommandContext;
use output::errors::ErrorFormatter;

/// Inspect npm projects: latest versions, outdated packages and installed trees
#[derive(Parser)]
#[command(name = "lockview", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Project directory (defaults to the current directory)
    #[arg(long, global = true, value_name = "DIR")]
    pub dir: Option<PathBuf>,

    /// Print machine-readable JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(flatten)]
    pub settings: SettingsArgs,
}

/// Flags overriding the configured settings
#[derive(Args, Debug, Default)]
pub struct SettingsArgs {
    /// Registry base URL
    #[arg(long, global = true, value_name = "URL")]
    pub registry: Option<String>,

    /// Maximum number of concurrent registry requests
    #[arg(long, global = true, value_name = "N")]
    pub concurrency: Option<usize>,

    /// Cache freshness window in seconds
    #[arg(long, global = true, value_name = "SECS")]
    pub ttl: Option<u64>,

    /// Registry cache file
    #[arg(long, global = true, value_name = "FILE")]
    pub cache_file: Option<Utf8PathBuf>,
}

impl SettingsArgs {
    fn into_layer(self) -> SettingsLayer {
        SettingsLayer {
            registry: self.registry,
            token: None,
            cache_ttl_secs: self.ttl,
            concurrency: self.concurrency,
            cache_file: self.cache_file,
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show the latest published version of packages
    Latest {
        /// Package names
        #[arg(required = true, value_name = "PACKAGE")]
        packages: Vec<String>,
    },
    /// Compare declared dependencies with the registry
    Outdated {
        /// Also list packages that are up to date
        #[arg(long)]
        all: bool,
    },
    /// Print the installed dependency tree
    Tree {
        /// Deepest level to show (direct dependencies are level 1)
        #[arg(long, value_name = "N")]
        depth: Option<usize>,
    },
    /// Inspect or maintain the registry cache
    Cache {
        #[command(subcommand)]
        action: CacheAction,
    },
}

#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheAction {
    /// Show entry counts and location
    Stats,
    /// Remove expired entries
    Prune,
    /// Remove every entry
    Clear,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    setup_logging(cli.verbose);
    setup_panic_handler();

    debug!("Starting lockview v{}", env!("CARGO_PKG_VERSION"));

    match run_cli(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}", ErrorFormatter::new().format_error(&e));
            ExitCode::FAILURE
        },
    }
}

fn run_cli(cli: Cli) -> LockviewResult<()> {
    // Create Tokio runtime for async operations
    let rt = tokio::runtime::Runtime::new()
        .map_err(|e| LockviewError::io("Failed to create async runtime".to_string(), e))?;

    rt.block_on(async {
        let ctx = CommandContext::new(cli.dir, cli.settings.into_layer(), cli.json).await?;
        commands::dispatch_command(cli.command, &ctx).await
    })
}

fn setup_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "warn" };

    // RUST_LOG wins over --verbose
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "lockview={level},lockview_core={level},lockview_config={level},lockview_registry={level},lockview_resolver={level}"
        ))
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn setup_panic_handler() {
    std::panic::set_hook(Box::new(|panic_info| {
        error!("lockview encountered an unexpected error: {}", panic_info);
        eprintln!("lockview crashed! This is a bug.");
        eprintln!("Please report this at: https://github.com/lockview/lockview/issues");
        eprintln!("Error: {}", panic_info);
    }));
}
