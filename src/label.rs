//! # Version Label Resolution
//!
//! A package is requested at an abstract version like `2.8.1`, but a
//! repository is synchronized to a concrete VCS label: a tag name or a
//! commit hash. This module turns a version string into the label the
//! package's descriptor calls for.
//!
//! Resolution precedence, first match wins:
//!
//! 1. A tag format template (`v%s` style) produces a tag mechanically.
//! 2. A version-to-tag map produces a tag; versions absent from the map
//!    fall back to the version string itself.
//! 3. A version-to-commit map produces a commit hash; versions absent from
//!    the map are a hard error, since a wrong guess at a commit cannot be
//!    detected later.
//! 4. With no hints at all, the version string is the tag.

use std::fmt;

use crate::config::PackageConfig;
use crate::error::{Error, Result};

/// The two ways a version can be pinned to repository history.
///
/// There is no third case: a label is always either a tag name or a commit
/// hash, and every sync path must handle both or reject one explicitly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LabelKind {
    Tag,
    Commit,
}

impl fmt::Display for LabelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LabelKind::Tag => write!(f, "tag"),
            LabelKind::Commit => write!(f, "commit"),
        }
    }
}

/// A concrete VCS label resolved from an abstract version string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionLabel {
    pub kind: LabelKind,
    pub value: String,
}

impl VersionLabel {
    pub fn tag(value: impl Into<String>) -> Self {
        Self {
            kind: LabelKind::Tag,
            value: value.into(),
        }
    }

    pub fn commit(value: impl Into<String>) -> Self {
        Self {
            kind: LabelKind::Commit,
            value: value.into(),
        }
    }
}

impl fmt::Display for VersionLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.kind, self.value)
    }
}

/// Resolve the VCS label for `version` according to the package descriptor.
///
/// `package` is only used for error context.
pub fn resolve(package: &str, config: &PackageConfig, version: &str) -> Result<VersionLabel> {
    if let Some(format) = &config.version_tag_format {
        return Ok(VersionLabel::tag(format.replacen("%s", version, 1)));
    }

    if let Some(tags) = &config.version_tags {
        let tag = tags.get(version).map(String::as_str).unwrap_or(version);
        return Ok(VersionLabel::tag(tag));
    }

    if let Some(commits) = &config.version_commits {
        return match commits.get(version) {
            Some(commit) => Ok(VersionLabel::commit(commit)),
            None => Err(Error::MissingCommitMapping {
                package: package.to_string(),
                version: version.to_string(),
            }),
        };
    }

    Ok(VersionLabel::tag(version))
}
