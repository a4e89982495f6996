//! # Build Metadata Probe
//!
//! Asks a working copy what version it thinks it is by running
//! `python setup.py --version` in it. Old sdist-era packages answer this
//! reliably; anything that cannot answer is treated as having no
//! self-reported version rather than as an error, because the callers all
//! have a fallback path.

use std::path::Path;
use std::process::{Command, Stdio};

use log::debug;

/// Report the version a working copy's own build metadata claims.
///
/// Returns `None` when the probe cannot run, exits non-zero, or prints
/// nothing.
pub fn probe_version(package_dir: &Path, python_bin: &str) -> Option<String> {
    let output = Command::new(python_bin)
        .args(["setup.py", "--version"])
        .current_dir(package_dir)
        .stdin(Stdio::null())
        .stderr(Stdio::null())
        .output();

    match output {
        Ok(output) if output.status.success() => {
            let version = String::from_utf8_lossy(&output.stdout).trim().to_string();
            if version.is_empty() {
                None
            } else {
                Some(version)
            }
        }
        Ok(output) => {
            debug!(
                "setup.py probe in {} exited with {}",
                package_dir.display(),
                output.status
            );
            None
        }
        Err(e) => {
            debug!(
                "setup.py probe in {} could not run: {}",
                package_dir.display(),
                e
            );
            None
        }
    }
}
