//! CLI argument parsing and command dispatch

use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::commands;

/// pipsource - Vendor and install pip packages from source
#[derive(Parser, Debug)]
#[command(name = "pipsource")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    command: Commands,

    /// Colorize output (always, never, auto)
    #[arg(long, global = true, value_name = "WHEN", default_value = "auto")]
    color: String,

    /// Set log level (error, warn, info, debug, trace)
    #[arg(long, global = true, value_name = "LEVEL", default_value = "warn")]
    log_level: String,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Vendor a pipenv project's full dependency graph and write its install script
    Vendor(commands::vendor::VendorArgs),

    /// Vendor the packages listed in a requirements file
    Sync(commands::sync::SyncArgs),

    /// Remove vendored packages no install script references
    Prune(commands::prune::PruneArgs),

    /// Generate shell completion scripts
    Completions(commands::completions::CompletionsArgs),
}

impl Cli {
    /// Execute the CLI command
    pub fn execute(self) -> Result<()> {
        init_logging(&self.log_level);

        match self.command {
            Commands::Vendor(args) => commands::vendor::execute(args, &self.color),
            Commands::Sync(args) => commands::sync::execute(args, &self.color),
            Commands::Prune(args) => commands::prune::execute(args, &self.color),
            Commands::Completions(args) => commands::completions::execute(args),
        }
    }
}

/// Initialize env_logger from the global `--log-level` flag.
///
/// `RUST_LOG` still wins when set, so per-module filters keep working.
fn init_logging(level: &str) {
    let env = env_logger::Env::default().default_filter_or(level);
    env_logger::Builder::from_env(env)
        .format_timestamp(None)
        .init();
}
