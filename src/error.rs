//! # Error Handling
//!
//! This module defines the centralized error handling mechanism for the
//! `pipsource` application. It uses the `thiserror` library to create a
//! comprehensive `Error` enum that covers all anticipated failure modes,
//! providing clear and descriptive error messages.
//!
//! ## Key Components
//!
//! - **`Error`**: The main enum that represents all possible errors that can
//!   occur within the application. Each variant corresponds to a specific
//!   type of error and includes contextual information to aid in debugging.
//!
//! - **`Result<T>`**: A type alias for `std::result::Result<T, Error>`, used
//!   throughout the application to simplify function signatures and ensure
//!   type safety.
//!
//! The `Error` enum is designed to be exhaustive and cover all possible
//! failure scenarios, including:
//!
//! - Package map configuration errors.
//! - Malformed requirements lines.
//! - Version label resolution failures.
//! - Subprocess execution failures and timeouts.
//! - Repository clone failures.
//! - Package index lookup errors.
//! - Path operations.
//! - I/O errors.
//! - JSON parsing errors.
//!
//! Each error variant includes contextual information (e.g., `package`,
//! `version`, `command`, `stderr`, `url`, `label`) so that a failure deep in
//! a vendoring run can still be attributed to the package that caused it.

use thiserror::Error;

use crate::label::LabelKind;
use crate::vcs::VcsKind;

/// Main error type for pipsource operations
#[derive(Error, Debug)]
pub enum Error {
    /// An error occurred while reading or validating the package map
    /// configuration file.
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// A requirements line did not follow the `name=version` format.
    #[error("Malformed requirements line: {line:?}")]
    MalformedRequirement { line: String },

    /// A package descriptor selects commit-based labeling but has no commit
    /// recorded for the requested version.
    #[error("No commit mapping for {package} version {version}")]
    MissingCommitMapping { package: String, version: String },

    /// A version label of this kind cannot be synchronized by the package's
    /// version control system.
    #[error("{vcs} vendoring of {package} does not support {kind} labels")]
    UnsupportedLabel {
        package: String,
        vcs: VcsKind,
        kind: LabelKind,
    },

    /// A package selected for vendoring has no repository URL configured.
    #[error("No git or hg repository configured for package {package}")]
    MissingSource { package: String },

    /// An external command exited with a non-zero status.
    #[error("Command failed: {command} - {stderr}")]
    ProcessFailed { command: String, stderr: String },

    /// An external command exceeded its allotted wall-clock time and was
    /// killed.
    #[error("Command timed out after {seconds}s: {command}")]
    ProcessTimeout { command: String, seconds: u64 },

    /// An error occurred while cloning a repository.
    ///
    /// Includes the repository URL, the version label being cloned, and the
    /// underlying error message.
    #[error("Clone error for {url}@{label}: {message}")]
    CloneFailed {
        url: String,
        label: String,
        message: String,
    },

    /// An error occurred while querying the package index for a repository
    /// URL.
    #[error("Package index lookup error for {package}: {message}")]
    Index { package: String, message: String },

    /// An error occurred with a path-related operation.
    #[error("Path operation error: {message}")]
    Path { message: String },

    /// An I/O error, wrapped from `std::io::Error`.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A JSON parsing error, wrapped from `serde_json::Error`.
    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),
}

/// A convenient type alias for `Result<T, Error>`.
pub type Result<T> = std::result::Result<T, Error>;
