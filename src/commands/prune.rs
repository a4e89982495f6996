//! # Prune Command Implementation
//!
//! This module implements the `prune` subcommand, which removes vendored
//! working copies that no install script references anymore. The install
//! scripts are the source of truth for what is in use: every
//! `pip_install_vendored` line marks its package as referenced, and any
//! directory under the vendor root without such a line is unused.
//!
//! Deletion asks for confirmation unless `--yes` is given; `--dry-run`
//! only lists the unused packages.

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;
use dialoguer::{theme::ColorfulTheme, Confirm};

use pipsource::defaults;
use pipsource::output::OutputConfig;
use pipsource::script;

/// Arguments for the prune command
#[derive(Args, Debug)]
pub struct PruneArgs {
    /// Install scripts whose referenced packages are kept
    #[arg(value_name = "SCRIPTS", required = true)]
    pub scripts: Vec<PathBuf>,

    /// Directory vendored package sources are checked out into
    #[arg(long, value_name = "DIR", env = "PIPSOURCE_VENDOR")]
    pub vendor_root: Option<PathBuf>,

    /// Show what would be removed without deleting anything
    #[arg(short = 'n', long)]
    pub dry_run: bool,

    /// Delete without asking for confirmation
    #[arg(short, long)]
    pub yes: bool,
}

/// Execute the `prune` command.
pub fn execute(args: PruneArgs, color: &str) -> Result<()> {
    let output = OutputConfig::from_env_and_flag(color);
    let vendor_root = args
        .vendor_root
        .clone()
        .unwrap_or_else(defaults::default_vendor_root);

    let mut referenced = BTreeSet::new();
    for script_path in &args.scripts {
        let text = fs::read_to_string(script_path)
            .with_context(|| format!("Failed to read install script {}", script_path.display()))?;
        referenced.extend(script::referenced_packages(&text));
    }

    let vendored = list_vendored(&vendor_root)?;
    let unused: Vec<&String> = vendored.difference(&referenced).collect();

    if unused.is_empty() {
        println!(
            "{} No unused vendored packages under {}",
            output.emoji("✅", "[OK]"),
            vendor_root.display()
        );
        return Ok(());
    }

    println!(
        "{} unused vendored packages under {}:",
        unused.len(),
        vendor_root.display()
    );
    for package in &unused {
        println!("  {}", package);
    }
    println!();

    if args.dry_run {
        println!(
            "{} Dry run mode - nothing was removed.",
            output.emoji("ℹ️", "[INFO]")
        );
        return Ok(());
    }

    if !args.yes {
        let theme = ColorfulTheme::default();
        let proceed = Confirm::with_theme(&theme)
            .with_prompt(format!("Remove {} unused packages?", unused.len()))
            .default(false)
            .interact()?;

        if !proceed {
            println!("Aborted; nothing was removed.");
            return Ok(());
        }
    }

    for package in &unused {
        let package_path = vendor_root.join(package);
        println!("Removing unused package at {}", package_path.display());
        fs::remove_dir_all(&package_path)
            .with_context(|| format!("Failed to remove {}", package_path.display()))?;
    }

    println!(
        "{} Removed {} unused packages",
        output.emoji("✅", "[OK]"),
        unused.len()
    );

    Ok(())
}

/// Names of the package working copies currently under the vendor root.
///
/// A missing root has nothing to prune. Stray files are not working copies
/// and are left alone.
fn list_vendored(vendor_root: &Path) -> Result<BTreeSet<String>> {
    let mut packages = BTreeSet::new();
    if !vendor_root.is_dir() {
        return Ok(packages);
    }
    for entry in fs::read_dir(vendor_root)? {
        let entry = entry?;
        if entry.file_type()?.is_dir() {
            packages.insert(entry.file_name().to_string_lossy().into_owned());
        }
    }
    Ok(packages)
}
