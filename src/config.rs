//! # Package Map Configuration
//!
//! The package map is a JSON file describing where each Python package's
//! source lives and how its release versions map onto repository history.
//! It is both read and written by pipsource: the `vendor` command records
//! newly discovered repository URLs and the versions it vendored, so the map
//! accumulates knowledge across runs.
//!
//! On disk the map looks like:
//!
//! ```json
//! {
//!   "packages": {
//!     "ansicolors": {
//!       "git": "https://github.com/jonathaneunice/colors",
//!       "version-tags": {
//!         "1.1.8": "v1.1.8"
//!       }
//!     }
//!   }
//! }
//! ```
//!
//! A missing file is treated as an empty map so a first run starts from
//! nothing. A file that exists but lacks a `packages` object is refused:
//! that shape means the file is not a package map at all, and overwriting it
//! on save would destroy whatever it was.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use log::info;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::vcs::VcsKind;

/// Source descriptor for one package.
///
/// All fields are optional; an empty descriptor means "vendor this package
/// from a repository I have not located yet".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageConfig {
    /// Git repository URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub git: Option<String>,

    /// Mercurial repository URL. Only consulted when `git` is absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hg: Option<String>,

    /// Version most recently vendored from this source.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vendored: Option<String>,

    /// Template producing a tag from a version, with `%s` standing in for
    /// the version string (`v%s` turns `1.2` into `v1.2`).
    #[serde(
        rename = "version-tag-format",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub version_tag_format: Option<String>,

    /// Explicit version-to-tag overrides for repositories with irregular
    /// tag naming.
    #[serde(
        rename = "version-tags",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub version_tags: Option<BTreeMap<String, String>>,

    /// Version-to-commit pins for repositories that do not tag releases.
    #[serde(
        rename = "version-commits",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub version_commits: Option<BTreeMap<String, String>>,

    /// Extra distribution requirements noted for this package.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub install_requires: Vec<String>,

    /// Never vendor this package.
    #[serde(rename = "skip-vendor", default, skip_serializing_if = "is_false")]
    pub skip_vendor: bool,

    /// Skip this package only when vendoring for a `python3` interpreter.
    #[serde(
        rename = "skip-vendor-python3",
        default,
        skip_serializing_if = "is_false"
    )]
    pub skip_vendor_python3: bool,
}

fn is_false(value: &bool) -> bool {
    !*value
}

impl PackageConfig {
    /// The repository this package is vendored from, if one is configured.
    ///
    /// Git wins over mercurial when a descriptor carries both URLs.
    pub fn source(&self) -> Option<(VcsKind, &str)> {
        if let Some(url) = self.git.as_deref() {
            return Some((VcsKind::Git, url));
        }
        self.hg.as_deref().map(|url| (VcsKind::Hg, url))
    }
}

/// The full package map: package name to source descriptor.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageMap {
    pub packages: BTreeMap<String, PackageConfig>,
}

impl PackageMap {
    /// Load a package map from `path`.
    ///
    /// A missing file yields an empty map. A present but malformed file is
    /// an [`Error::Config`] error.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.is_file() {
            info!(
                "package map {} does not exist yet, starting empty",
                path.display()
            );
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)?;
        let map: Self = serde_json::from_str(&content).map_err(|e| Error::Config {
            message: format!("{}: {}", path.display(), e),
        })?;
        map.validate()?;
        Ok(map)
    }

    /// Write the map to `path` as pretty-printed JSON with sorted keys.
    ///
    /// Parent directories are created as needed. This is the only place the
    /// map is serialized, so every save goes through the same formatting.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut json = serde_json::to_string_pretty(self)?;
        json.push('\n');
        fs::write(path, json)?;
        Ok(())
    }

    /// Check descriptor fields that serde cannot.
    pub fn validate(&self) -> Result<()> {
        for (package, config) in &self.packages {
            for (field, url) in [("git", &config.git), ("hg", &config.hg)] {
                if let Some(url) = url {
                    if url.trim().is_empty() {
                        return Err(Error::Config {
                            message: format!("package {}: {} URL is empty", package, field),
                        });
                    }
                }
            }

            if let Some(format) = &config.version_tag_format {
                if format.matches("%s").count() != 1 {
                    return Err(Error::Config {
                        message: format!(
                            "package {}: version-tag-format {:?} must contain exactly one %s",
                            package, format
                        ),
                    });
                }
            }
        }
        Ok(())
    }

    /// Whether `package` should be vendored for the given interpreter.
    ///
    /// Packages without a descriptor are vendored; the skip flags opt out.
    pub fn should_vendor(&self, package: &str, python_bin: &str) -> bool {
        match self.packages.get(package) {
            None => true,
            Some(config) => {
                if python_bin == "python3" && config.skip_vendor_python3 {
                    return false;
                }
                !config.skip_vendor
            }
        }
    }

    /// Record that `version` of `package` was successfully vendored.
    pub fn record_vendored(&mut self, package: &str, version: &str) {
        if let Some(config) = self.packages.get_mut(package) {
            config.vendored = Some(version.to_string());
        }
    }
}
