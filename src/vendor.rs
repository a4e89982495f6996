//! # Vendoring Engine
//!
//! Ties the pieces together: given an ordered requirement list and the
//! package map, the engine discovers missing repository URLs, resolves each
//! version to its VCS label, and hands the working copy to the right
//! synchronizer.
//!
//! The engine is deliberately sequential. The subprocess-heavy work is
//! dominated by network clones, interleaved output from parallel clones is
//! unreadable, and a typical run touches a few dozen packages at most.
//!
//! Collaborators sit behind traits so tests can exercise the engine without
//! git, hg or a network.

use std::path::PathBuf;
use std::time::Duration;

use log::{info, warn};

use crate::config::{PackageConfig, PackageMap};
use crate::error::{Error, Result};
use crate::index::{PackageIndex, PypiIndex};
use crate::label;
use crate::requirements::Requirement;
use crate::vcs::{GitSync, HgSync, SyncOutcome, Synchronizer, VcsKind};

/// Totals for a vendoring run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct VendorSummary {
    pub cloned: usize,
    pub reused: usize,
}

impl VendorSummary {
    pub fn record(&mut self, outcome: SyncOutcome) {
        match outcome {
            SyncOutcome::Cloned => self.cloned += 1,
            SyncOutcome::AlreadyCurrent => self.reused += 1,
        }
    }
}

/// Coordinates source discovery and working copy synchronization.
pub struct VendorEngine {
    vendor_root: PathBuf,
    git: Box<dyn Synchronizer>,
    hg: Box<dyn Synchronizer>,
    index: Box<dyn PackageIndex>,
}

impl VendorEngine {
    pub fn new(vendor_root: PathBuf, python_bin: &str, timeout: Duration) -> Self {
        Self {
            git: Box::new(GitSync::new(timeout)),
            hg: Box::new(HgSync::new(timeout, python_bin)),
            index: Box::new(PypiIndex::new()),
            vendor_root,
        }
    }

    /// Construct an engine from explicit collaborators, for testing.
    #[cfg(test)]
    pub fn with_components(
        vendor_root: PathBuf,
        git: Box<dyn Synchronizer>,
        hg: Box<dyn Synchronizer>,
        index: Box<dyn PackageIndex>,
    ) -> Self {
        Self {
            vendor_root,
            git,
            hg,
            index,
        }
    }

    /// Directory a package's working copy lives in.
    pub fn package_dir(&self, package: &str) -> PathBuf {
        self.vendor_root.join(package)
    }

    /// Look up repository URLs for packages the map does not know yet.
    ///
    /// Found URLs are recorded in the map as git sources. Returns the
    /// packages the index could not place; the caller decides whether that
    /// is fatal.
    pub fn discover_sources(
        &self,
        packages: &[Requirement],
        map: &mut PackageMap,
    ) -> Result<Vec<String>> {
        let mut unresolved = Vec::new();

        for req in packages {
            if map.packages.contains_key(&req.package) {
                continue;
            }

            match self.index.repository_url(&req.package)? {
                Some(url) => {
                    info!("found repository for {}: {}", req.package, url);
                    map.packages.insert(
                        req.package.clone(),
                        PackageConfig {
                            git: Some(url),
                            ..Default::default()
                        },
                    );
                }
                None => {
                    warn!("no repository found for {}", req.package);
                    unresolved.push(req.package.clone());
                }
            }
        }

        Ok(unresolved)
    }

    /// Vendor every requirement in order, recording successes in the map.
    ///
    /// `on_start` runs before each package's sync, for progress reporting.
    /// The loop is fail-fast: the first error aborts the remaining queue,
    /// leaving already-synchronized packages on disk and recorded in the
    /// map.
    pub fn vendor_all<F>(
        &self,
        requirements: &[Requirement],
        map: &mut PackageMap,
        mut on_start: F,
    ) -> Result<VendorSummary>
    where
        F: FnMut(&Requirement),
    {
        let mut summary = VendorSummary::default();

        for req in requirements {
            on_start(req);
            info!("vendoring {} {}", req.package, req.version);
            let outcome = self.vendor_one(req, map)?;
            summary.record(outcome);
            map.record_vendored(&req.package, &req.version);
        }

        Ok(summary)
    }

    /// Bring one package's working copy to its requested version.
    pub fn vendor_one(&self, req: &Requirement, map: &PackageMap) -> Result<SyncOutcome> {
        let config = map.packages.get(&req.package).ok_or_else(|| {
            Error::MissingSource {
                package: req.package.clone(),
            }
        })?;

        let label = label::resolve(&req.package, config, &req.version)?;

        let (kind, url) = config.source().ok_or_else(|| Error::MissingSource {
            package: req.package.clone(),
        })?;

        let synchronizer: &dyn Synchronizer = match kind {
            VcsKind::Git => self.git.as_ref(),
            VcsKind::Hg => self.hg.as_ref(),
        };

        synchronizer.sync(&self.package_dir(&req.package), &label, url, &req.version)
    }
}

/// Describe what vendoring `req` would do, without touching disk or network.
///
/// Dry runs print one of these per requirement. A package absent from the
/// map still gets a plan line (the default descriptor labels the version
/// string itself as the tag); label resolution failures surface here just
/// like they would in a real run.
pub fn plan_line(req: &Requirement, map: &PackageMap) -> Result<String> {
    let default_config = PackageConfig::default();
    let config = map.packages.get(&req.package).unwrap_or(&default_config);
    let label = label::resolve(&req.package, config, &req.version)?;

    Ok(match config.source() {
        Some((kind, url)) => format!(
            "{} {} -> {} {} ({})",
            req.package, req.version, kind, label, url
        ),
        None => format!(
            "{} {} -> {} (no repository configured)",
            req.package, req.version, label
        ),
    })
}
