//! Mercurial working copy synchronization.
//!
//! Mercurial sources are tag-only: no packages pin hg revisions by hash, so
//! a commit label is rejected outright instead of half-supported. Unlike
//! git checkouts, hg metadata is left in place between runs.

use std::fs;
use std::path::Path;
use std::time::Duration;

use log::{debug, info};

use crate::error::{Error, Result};
use crate::label::{LabelKind, VersionLabel};
use crate::process::{path_arg, run_capture, run_streamed};
use crate::setup_py;
use crate::vcs::{clone_error, package_name_of, SyncOutcome, Synchronizer, VcsKind};

/// Mercurial metadata directory name.
const HG_DIR: &str = ".hg";

/// Synchronizes mercurial-backed packages using the system `hg` command.
pub struct HgSync {
    timeout: Duration,
    python_bin: String,
}

impl HgSync {
    pub fn new(timeout: Duration, python_bin: impl Into<String>) -> Self {
        Self {
            timeout,
            python_bin: python_bin.into(),
        }
    }

    /// Whether the existing working copy already holds the requested
    /// release.
    fn is_current(&self, package_dir: &Path, tag: &str, version: &str) -> Result<bool> {
        let latest = run_capture(
            "hg",
            &["log", "-r", ".", "--template", "{latesttag}"],
            package_dir,
            self.timeout,
        )?;
        if latest == tag {
            return Ok(true);
        }

        // Some repositories tag after the release commit, so the checkout
        // may not answer with the tag; fall back to what the tree says
        // about itself.
        match setup_py::probe_version(package_dir, &self.python_bin) {
            Some(probed) if probed == version => Ok(true),
            _ => Ok(false),
        }
    }
}

impl Synchronizer for HgSync {
    fn sync(
        &self,
        package_dir: &Path,
        label: &VersionLabel,
        url: &str,
        version: &str,
    ) -> Result<SyncOutcome> {
        let tag = match label.kind {
            LabelKind::Tag => label.value.as_str(),
            LabelKind::Commit => {
                return Err(Error::UnsupportedLabel {
                    package: package_name_of(package_dir),
                    vcs: VcsKind::Hg,
                    kind: LabelKind::Commit,
                })
            }
        };

        if package_dir.is_dir()
            && package_dir.join(HG_DIR).is_dir()
            && self.is_current(package_dir, tag, version)?
        {
            debug!("{} already at tag {}", package_dir.display(), tag);
            return Ok(SyncOutcome::AlreadyCurrent);
        }

        if package_dir.exists() {
            fs::remove_dir_all(package_dir)?;
        }
        // hg creates the destination itself but wants the parent to exist
        if let Some(parent) = package_dir.parent() {
            fs::create_dir_all(parent)?;
        }

        info!("cloning {} at tag {} into {}", url, tag, package_dir.display());
        let target = path_arg(package_dir)?;
        run_streamed(
            "hg",
            &["clone", "-r", tag, url, target],
            None,
            &[],
            self.timeout,
        )
        .map_err(|e| clone_error(url, label, e))?;

        Ok(SyncOutcome::Cloned)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_sync_rejects_commit_labels() {
        let sync = HgSync::new(Duration::from_secs(5), "python");
        let result = sync.sync(
            &PathBuf::from("/srv/vendor/python-editor"),
            &VersionLabel::commit("deadbeef"),
            "https://bitbucket.org/x/python-editor",
            "1.0.3",
        );
        match result {
            Err(Error::UnsupportedLabel { package, vcs, kind }) => {
                assert_eq!(package, "python-editor");
                assert_eq!(vcs, VcsKind::Hg);
                assert_eq!(kind, LabelKind::Commit);
            }
            other => panic!("expected UnsupportedLabel, got {:?}", other),
        }
    }
}
