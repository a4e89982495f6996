//! # Working Copy Synchronization
//!
//! Each vendored package is a checkout of its upstream repository pinned to
//! a version label. The [`Synchronizer`] trait is the seam between the
//! vendoring engine and the concrete version control systems; the engine
//! only ever asks "make this directory hold this label" and learns whether
//! a fresh clone was necessary.
//!
//! Synchronization is idempotent: a working copy already at the requested
//! label is left byte-for-byte untouched, which keeps repeated vendoring
//! runs from churning local patches or timestamps.

pub mod git;
pub mod hg;

use std::fmt;
use std::path::Path;

use crate::error::{Error, Result};
use crate::label::VersionLabel;

pub use git::GitSync;
pub use hg::HgSync;

/// The version control systems a package source can live in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VcsKind {
    Git,
    Hg,
}

impl fmt::Display for VcsKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VcsKind::Git => write!(f, "git"),
            VcsKind::Hg => write!(f, "hg"),
        }
    }
}

/// What a synchronization run did to the working copy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncOutcome {
    /// The working copy already matched the requested label and was left
    /// untouched.
    AlreadyCurrent,
    /// The working copy was (re)created by cloning.
    Cloned,
}

/// Brings a package working copy to a requested version label.
pub trait Synchronizer {
    /// Ensure `package_dir` holds the source tree for `label` from `url`.
    ///
    /// `version` is the abstract version string the label was resolved
    /// from; implementations may consult it as a secondary identity check
    /// when the repository's own metadata cannot answer.
    fn sync(
        &self,
        package_dir: &Path,
        label: &VersionLabel,
        url: &str,
        version: &str,
    ) -> Result<SyncOutcome>;
}

/// Package name for error context, taken from the directory name.
pub(crate) fn package_name_of(package_dir: &Path) -> String {
    package_dir
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| package_dir.display().to_string())
}

/// Attribute a subprocess failure during cloning to the clone itself.
///
/// Timeouts keep their own classification so the caller can tell a hung
/// remote from a refused one.
pub(crate) fn clone_error(url: &str, label: &VersionLabel, source: Error) -> Error {
    match source {
        Error::ProcessFailed { stderr, .. } => Error::CloneFailed {
            url: url.to_string(),
            label: label.value.clone(),
            message: stderr,
        },
        other => other,
    }
}
