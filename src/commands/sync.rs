//! # Sync Command Implementation
//!
//! This module implements the `sync` subcommand, which vendors an explicit
//! list of packages from a `name=version` requirements file. Unlike
//! `vendor`, it asks no dependency-resolution tool anything: the file order
//! is the processing order, and no install script is written.
//!
//! Repository discovery, label resolution and working-copy synchronization
//! work exactly as in `vendor`: unknown packages are looked up in the
//! package index, found URLs are persisted, and the run aborts on the first
//! failure.

use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::{bail, Context, Result};
use clap::Args;
use indicatif::ProgressBar;

use pipsource::config::PackageMap;
use pipsource::defaults;
use pipsource::output::OutputConfig;
use pipsource::requirements;
use pipsource::vendor::{plan_line, VendorEngine};

/// Arguments for the sync command
#[derive(Args, Debug)]
pub struct SyncArgs {
    /// Requirements file listing `name=version` pairs to vendor
    #[arg(value_name = "REQUIREMENTS_FILE")]
    pub requirements_file: PathBuf,

    /// Path to the package map config file
    #[arg(long, value_name = "FILE", env = "PIPSOURCE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Directory vendored package sources are checked out into
    #[arg(long, value_name = "DIR", env = "PIPSOURCE_VENDOR")]
    pub vendor_root: Option<PathBuf>,

    /// Python interpreter for version probes
    #[arg(long, value_name = "BIN", default_value = defaults::DEFAULT_PYTHON_BIN)]
    pub python_bin: String,

    /// Wall-clock timeout in seconds for each external command
    #[arg(long, value_name = "SECS", default_value_t = defaults::DEFAULT_PROCESS_TIMEOUT_SECS)]
    pub vcs_timeout: u64,

    /// Show the vendor plan without making changes
    #[arg(short = 'n', long)]
    pub dry_run: bool,

    /// Suppress all output except errors
    #[arg(short, long)]
    pub quiet: bool,
}

/// Execute the `sync` command.
pub fn execute(args: SyncArgs, color: &str) -> Result<()> {
    let start_time = Instant::now();
    let output = OutputConfig::from_env_and_flag(color);

    let config_path = args
        .config
        .clone()
        .unwrap_or_else(defaults::default_config_path);
    let vendor_root = args
        .vendor_root
        .clone()
        .unwrap_or_else(defaults::default_vendor_root);
    let timeout = Duration::from_secs(args.vcs_timeout);

    if !args.quiet {
        println!("{} pipsource sync", output.emoji("📦", "[SYNC]"));
        println!();

        if args.dry_run {
            println!(
                "{} DRY RUN MODE - no changes will be made",
                output.emoji("🔎", "[DRY RUN]")
            );
            println!();
        }
    }

    let listed = requirements::from_file(&args.requirements_file).with_context(|| {
        format!(
            "Failed to read requirements from {}",
            args.requirements_file.display()
        )
    })?;
    let mut map = PackageMap::load(&config_path)?;

    if listed.is_empty() {
        if !args.quiet {
            println!(
                "Nothing to vendor: {} lists no packages.",
                args.requirements_file.display()
            );
        }
        return Ok(());
    }

    if args.dry_run {
        println!(
            "Vendor plan for {} packages into {}:",
            listed.len(),
            vendor_root.display()
        );
        for req in &listed {
            println!("  {}", plan_line(req, &map)?);
        }
        return Ok(());
    }

    let engine = VendorEngine::new(vendor_root, &args.python_bin, timeout);
    let unresolved = engine.discover_sources(&listed, &mut map)?;
    map.save(&config_path)?;
    if !unresolved.is_empty() {
        for package in &unresolved {
            eprintln!(
                "{} No repository found for package: {}",
                output.emoji("❌", "[ERROR]"),
                package
            );
        }
        bail!(
            "Could not find repositories for {} of {} packages; add them to {} by hand",
            unresolved.len(),
            listed.len(),
            config_path.display()
        );
    }

    let progress = if args.quiet {
        ProgressBar::hidden()
    } else {
        output.progress_bar(listed.len())
    };
    let summary = engine.vendor_all(&listed, &mut map, |req| {
        progress.set_message(format!("{} {}", req.package, req.version));
        emit(
            &progress,
            args.quiet,
            format!("Vendoring {} {}", req.package, req.version),
        );
        progress.inc(1);
    })?;
    progress.finish_and_clear();
    map.save(&config_path)?;

    if !args.quiet {
        let duration = start_time.elapsed();
        println!(
            "{} Vendored {} packages ({} cloned, {} reused) in {:.2}s",
            output.emoji("✅", "[OK]"),
            listed.len(),
            summary.cloned,
            summary.reused,
            duration.as_secs_f64()
        );
    }

    Ok(())
}

/// Print a line without corrupting a visible progress bar.
fn emit(progress: &ProgressBar, quiet: bool, line: String) {
    if quiet {
        return;
    }
    if progress.is_hidden() {
        println!("{}", line);
    } else {
        progress.println(line);
    }
}
