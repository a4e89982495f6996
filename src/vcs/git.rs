//! Git working copy synchronization.
//!
//! Vendored checkouts have their `.git` directory parked as `.git-moved`
//! between runs, so the vendor tree can live inside another repository
//! without confusing it with nested metadata. Every sync therefore starts
//! by un-parking the metadata, inspects what the working copy is pinned to,
//! reclones only on mismatch, and parks the metadata again before
//! returning.

use std::fs;
use std::io;
use std::path::Path;
use std::time::Duration;

use log::{debug, info};

use crate::error::Result;
use crate::label::{LabelKind, VersionLabel};
use crate::process::{path_arg, run_capture, run_streamed};
use crate::vcs::{clone_error, SyncOutcome, Synchronizer};

/// Live git metadata directory name.
const GIT_DIR: &str = ".git";

/// Name the metadata directory is parked under between runs.
const CONCEALED_GIT_DIR: &str = ".git-moved";

/// Synchronizes git-backed packages.
///
/// This shells out to the system git command, which automatically handles:
/// - SSH keys from ~/.ssh/
/// - Git credential helpers
/// - Personal access tokens
/// - Any authentication configured in ~/.gitconfig
pub struct GitSync {
    timeout: Duration,
}

impl GitSync {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    /// Whether the revealed working copy is already pinned to `label`.
    ///
    /// Inspection failures are fatal rather than treated as a mismatch: a
    /// working copy that cannot answer is in a state a reclone might make
    /// worse, so a human should look at it.
    fn current_label_matches(&self, package_dir: &Path, label: &VersionLabel) -> Result<bool> {
        let current = match label.kind {
            LabelKind::Tag => run_capture(
                "git",
                &["describe", "--tags", "--exact-match"],
                package_dir,
                self.timeout,
            )?,
            LabelKind::Commit => run_capture(
                "git",
                &["rev-parse", "--verify", "HEAD"],
                package_dir,
                self.timeout,
            )?,
        };
        Ok(current == label.value)
    }

    fn clone_fresh(&self, package_dir: &Path, label: &VersionLabel, url: &str) -> Result<()> {
        // git won't clone into an existing non-empty directory
        if package_dir.exists() {
            fs::remove_dir_all(package_dir)?;
        }
        fs::create_dir_all(package_dir)?;

        let target = path_arg(package_dir)?;
        let args: Vec<&str> = match label.kind {
            // A tag can be fetched shallowly; one commit of history is all
            // a vendored tree needs.
            LabelKind::Tag => vec![
                "clone",
                "--depth",
                "1",
                "--branch",
                &label.value,
                url,
                target,
            ],
            // An arbitrary commit cannot be named at clone time, so take
            // the full history and check it out afterwards.
            LabelKind::Commit => vec!["clone", url, target],
        };

        run_streamed("git", &args, None, &[], self.timeout)
            .map_err(|e| clone_error(url, label, e))?;

        if label.kind == LabelKind::Commit {
            run_streamed(
                "git",
                &["checkout", &label.value],
                Some(package_dir),
                &[],
                self.timeout,
            )
            .map_err(|e| clone_error(url, label, e))?;
        }

        Ok(())
    }
}

impl Synchronizer for GitSync {
    fn sync(
        &self,
        package_dir: &Path,
        label: &VersionLabel,
        url: &str,
        _version: &str,
    ) -> Result<SyncOutcome> {
        let mut clone_needed = true;

        if package_dir.is_dir() {
            reveal_metadata(package_dir)?;
            if package_dir.join(GIT_DIR).is_dir() {
                clone_needed = !self.current_label_matches(package_dir, label)?;
            }
        }

        if clone_needed {
            info!("cloning {} at {} into {}", url, label, package_dir.display());
            self.clone_fresh(package_dir, label, url)?;
        } else {
            debug!("{} already at {}", package_dir.display(), label);
        }

        conceal_metadata(package_dir)?;

        Ok(if clone_needed {
            SyncOutcome::Cloned
        } else {
            SyncOutcome::AlreadyCurrent
        })
    }
}

/// Put a parked metadata directory back so git commands work again.
pub fn reveal_metadata(package_dir: &Path) -> Result<()> {
    rename_if_present(
        &package_dir.join(CONCEALED_GIT_DIR),
        &package_dir.join(GIT_DIR),
    )
}

/// Park the metadata directory so the checkout looks like plain source.
pub fn conceal_metadata(package_dir: &Path) -> Result<()> {
    rename_if_present(
        &package_dir.join(GIT_DIR),
        &package_dir.join(CONCEALED_GIT_DIR),
    )
}

/// Rename `from` to `to`, treating a missing source as a no-op.
fn rename_if_present(from: &Path, to: &Path) -> Result<()> {
    match fs::rename(from, to) {
        Ok(()) => {
            debug!("renamed {} -> {}", from.display(), to.display());
            Ok(())
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e.into()),
    }
}
