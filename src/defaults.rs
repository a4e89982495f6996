//! Default values for pipsource configuration.
//!
//! This module provides centralized default values used across commands,
//! ensuring consistency and avoiding duplication.

use std::path::PathBuf;

/// File name of the generated installer script, written into the project
/// directory.
pub const INSTALL_SCRIPT_NAME: &str = "install_venv_vendored.sh";

/// Name of the virtualenv the generated installer script creates inside the
/// project directory.
pub const VENV_DIR_NAME: &str = ".venv-vendored";

/// Default Python interpreter used for virtualenv creation and build
/// metadata probes.
pub const DEFAULT_PYTHON_BIN: &str = "python";

/// Default wall-clock timeout in seconds for each external command (git, hg,
/// pipenv).
pub const DEFAULT_PROCESS_TIMEOUT_SECS: u64 = 600;

/// Returns the default package map path: `~/.pipsource/config.json`.
///
/// Falls back to `.pipsource/config.json` in the current directory if the
/// home directory cannot be determined.
///
/// This can be overridden by the `--config` CLI flag or the
/// `PIPSOURCE_CONFIG` environment variable.
pub fn default_config_path() -> PathBuf {
    pipsource_home().join("config.json")
}

/// Returns the default vendor root directory: `~/.pipsource/vendor`.
///
/// Every vendored package lives in a subdirectory of this root named after
/// the package.
///
/// This can be overridden by the `--vendor-root` CLI flag or the
/// `PIPSOURCE_VENDOR` environment variable.
pub fn default_vendor_root() -> PathBuf {
    pipsource_home().join("vendor")
}

/// Returns the default location of the shell helper library the generated
/// installer script sources: `~/.pipsource/venv_vendor_util.sh`.
pub fn default_helper_script() -> PathBuf {
    pipsource_home().join("venv_vendor_util.sh")
}

fn pipsource_home() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".pipsource")
}
