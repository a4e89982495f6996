//! # Vendor Command Implementation
//!
//! This module implements the `vendor` subcommand, which vendors a pipenv
//! project's full dependency graph from source:
//!
//! 1. Bootstrap the project virtualenv with pipenv if it is missing.
//! 2. Read the reverse dependency graph and order packages by depth, so
//!    each package is listed before the packages it depends on.
//! 3. Discover repository URLs for packages the map does not know yet, and
//!    persist what was found.
//! 4. Synchronize every package's working copy to its resolved version
//!    label, fail-fast.
//! 5. Write the install script that rebuilds the project virtualenv from
//!    the vendored checkouts.
//!
//! A `--dry-run` stops after step 2 and prints the ordered plan with each
//! package's resolved label, touching neither disk nor network.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use anyhow::{bail, Context, Result};
use clap::Args;
use indicatif::ProgressBar;

use pipsource::config::PackageMap;
use pipsource::defaults;
use pipsource::graph::{order_packages, GraphParser, PipenvGraphParser};
use pipsource::output::OutputConfig;
use pipsource::process;
use pipsource::requirements::Requirement;
use pipsource::script;
use pipsource::vendor::{plan_line, VendorEngine};

/// Arguments for the vendor command
#[derive(Args, Debug)]
pub struct VendorArgs {
    /// Pipenv project directory whose dependency graph is vendored
    #[arg(value_name = "PROJECT_DIR")]
    pub project_dir: PathBuf,

    /// Path to the package map config file
    #[arg(long, value_name = "FILE", env = "PIPSOURCE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Directory vendored package sources are checked out into
    #[arg(long, value_name = "DIR", env = "PIPSOURCE_VENDOR")]
    pub vendor_root: Option<PathBuf>,

    /// Python interpreter for the install script and version probes
    #[arg(long, value_name = "BIN", default_value = defaults::DEFAULT_PYTHON_BIN)]
    pub python_bin: String,

    /// Read the reverse dependency listing from a file instead of pipenv
    #[arg(long, value_name = "FILE")]
    pub graph_file: Option<PathBuf>,

    /// Shell helper library the generated install script sources
    #[arg(long, value_name = "PATH")]
    pub helper_script: Option<PathBuf>,

    /// Wall-clock timeout in seconds for each external command
    #[arg(long, value_name = "SECS", default_value_t = defaults::DEFAULT_PROCESS_TIMEOUT_SECS)]
    pub vcs_timeout: u64,

    /// Skip writing the install script
    #[arg(long)]
    pub no_install_script: bool,

    /// Show the ordered vendor plan without making changes
    #[arg(short = 'n', long)]
    pub dry_run: bool,

    /// Suppress all output except errors
    #[arg(short, long)]
    pub quiet: bool,
}

/// Execute the `vendor` command.
pub fn execute(args: VendorArgs, color: &str) -> Result<()> {
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
    let helper_script = args
        .helper_script
        .clone()
        .unwrap_or_else(defaults::default_helper_script);
    let timeout = Duration::from_secs(args.vcs_timeout);

    if !args.project_dir.is_dir() {
        bail!(
            "Project directory not found: {}",
            args.project_dir.display()
        );
    }

    if !args.quiet {
        println!("{} pipsource vendor", output.emoji("📦", "[VENDOR]"));
        println!();

        if args.dry_run {
            println!(
                "{} DRY RUN MODE - no changes will be made",
                output.emoji("🔎", "[DRY RUN]")
            );
            println!();
        }
    }

    let mut map = PackageMap::load(&config_path)?;

    // pipenv graph needs the project virtualenv to exist.
    if !args.dry_run && args.graph_file.is_none() {
        ensure_project_venv(&args.project_dir, timeout, args.quiet)?;
    }

    let listing = match &args.graph_file {
        Some(path) => fs::read_to_string(path)
            .with_context(|| format!("Failed to read graph file {}", path.display()))?,
        None => {
            if !args.quiet {
                println!(
                    "{} Reading dependency graph from pipenv",
                    output.emoji("🔍", "[GRAPH]")
                );
            }
            process::run_capture(
                "pipenv",
                &["graph", "--reverse", "--bare"],
                &args.project_dir,
                timeout,
            )?
        }
    };

    let entries = PipenvGraphParser::new().parse(&listing);
    let ordered = order_packages(&entries, |package| {
        map.should_vendor(package, &args.python_bin)
    });

    if ordered.is_empty() {
        if !args.quiet {
            println!("Nothing to vendor: the dependency graph lists no packages.");
        }
        return Ok(());
    }

    if args.dry_run {
        print_plan(&ordered, &map, &vendor_root)?;
        return Ok(());
    }

    // Fill in repository URLs the map does not know yet. Save before
    // bailing on unresolved packages so successful lookups are kept.
    let engine = VendorEngine::new(vendor_root.clone(), &args.python_bin, timeout);
    let unresolved = engine.discover_sources(&ordered, &mut map)?;
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
            ordered.len(),
            config_path.display()
        );
    }

    let progress = if args.quiet {
        ProgressBar::hidden()
    } else {
        output.progress_bar(ordered.len())
    };
    let summary = engine.vendor_all(&ordered, &mut map, |req| {
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

    if !args.no_install_script {
        let script_path = script::write_install_script(
            &args.project_dir,
            &ordered,
            &vendor_root,
            &args.python_bin,
            &helper_script,
        )?;
        if !args.quiet {
            println!(
                "{} Wrote install script {}",
                output.emoji("📝", "[SCRIPT]"),
                script_path.display()
            );
        }
    }

    if !args.quiet {
        let duration = start_time.elapsed();
        println!(
            "{} Vendored {} packages ({} cloned, {} reused) in {:.2}s",
            output.emoji("✅", "[OK]"),
            ordered.len(),
            summary.cloned,
            summary.reused,
            duration.as_secs_f64()
        );
    }

    Ok(())
}

/// Run `pipenv install` when the project has no `.venv` yet.
///
/// `PIPENV_VENV_IN_PROJECT` keeps the virtualenv inside the project so the
/// same check finds it on the next run.
fn ensure_project_venv(project_dir: &Path, timeout: Duration, quiet: bool) -> Result<()> {
    if project_dir.join(".venv").is_dir() {
        return Ok(());
    }
    if !quiet {
        println!("Setting up the project virtualenv with pipenv...");
    }
    process::run_streamed(
        "pipenv",
        &["install", "--ignore-pipfile"],
        Some(project_dir),
        &[("PIPENV_VENV_IN_PROJECT", "1")],
        timeout,
    )?;
    Ok(())
}

/// Print the ordered dry-run plan, one resolved label per package.
fn print_plan(ordered: &[Requirement], map: &PackageMap, vendor_root: &Path) -> Result<()> {
    println!(
        "Vendor plan for {} packages into {}:",
        ordered.len(),
        vendor_root.display()
    );
    for req in ordered {
        println!("  {}", plan_line(req, map)?);
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
