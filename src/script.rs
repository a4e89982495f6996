//! # Installer Script Generation
//!
//! The end product of a vendoring run is a shell script the project can run
//! to build its virtualenv from the vendored checkouts. The script sources
//! a helper library providing `pip_install_vendored`, then installs each
//! package in dependency order inside a fresh virtualenv.
//!
//! The script is also the record of what a project uses: `prune` reads the
//! install lines back to learn which vendored checkouts are still
//! referenced.

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use log::debug;
use regex::Regex;

use crate::defaults::{INSTALL_SCRIPT_NAME, VENV_DIR_NAME};
use crate::error::Result;
use crate::requirements::Requirement;
use crate::setup_py;

/// Render one installer line for a vendored package.
///
/// A checkout that cannot report its own version gets the extra
/// `git_version_tag` argument, telling the helper to trust the repository
/// tag instead of build metadata when it verifies the install.
pub fn install_line(req: &Requirement, package_dir: &Path, python_bin: &str) -> String {
    debug!("checking whether {} needs the git tag fallback", req.package);
    let mut line = format!("pip_install_vendored {} \"{}\"", req.package, req.version);
    if setup_py::probe_version(package_dir, python_bin).is_none() {
        line.push_str(" git_version_tag");
    }
    line
}

/// Write the project's installer script and mark it executable.
///
/// Returns the path of the written script.
pub fn write_install_script(
    project_dir: &Path,
    packages: &[Requirement],
    vendor_root: &Path,
    python_bin: &str,
    helper_script: &Path,
) -> Result<PathBuf> {
    let mut lines = vec![
        "#!/usr/bin/env bash".to_string(),
        "set -e".to_string(),
        format!("source {}", helper_script.display()),
        format!(
            "virtualenv --no-download {} --python=$(which {})",
            VENV_DIR_NAME, python_bin
        ),
        format!("source {}/bin/activate", VENV_DIR_NAME),
    ];

    for req in packages {
        lines.push(install_line(
            req,
            &vendor_root.join(&req.package),
            python_bin,
        ));
    }
    lines.push("deactivate".to_string());

    let path = project_dir.join(INSTALL_SCRIPT_NAME);
    let mut content = lines.join("\n");
    content.push('\n');
    fs::write(&path, content)?;
    make_executable(&path)?;
    Ok(path)
}

#[cfg(unix)]
fn make_executable(path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;

    let mut permissions = fs::metadata(path)?.permissions();
    permissions.set_mode(permissions.mode() | 0o100);
    fs::set_permissions(path, permissions)?;
    Ok(())
}

#[cfg(not(unix))]
fn make_executable(_path: &Path) -> Result<()> {
    Ok(())
}

/// Package names referenced by an installer script's install lines.
pub fn referenced_packages(script_text: &str) -> BTreeSet<String> {
    script_text
        .lines()
        .filter_map(|line| install_pattern().captures(line))
        .map(|caps| caps[1].to_string())
        .collect()
}

fn install_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^pip_install_vendored ([^ ]+) ").expect("hard-coded pattern compiles")
    })
}
