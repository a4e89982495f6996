//! # pipsource Library
//!
//! This library provides the core functionality for vendoring Python
//! packages from their git or mercurial sources into a reviewable local
//! tree. It is designed to be used by the `pipsource` command-line tool but
//! can also be integrated into other applications that need source-pinned
//! dependency management.
//!
//! ## Quick Example
//!
//! ```
//! use pipsource::config::PackageConfig;
//! use pipsource::graph::{order_packages, GraphParser, PipenvGraphParser};
//! use pipsource::label;
//!
//! // Parse a reverse dependency listing into depth-annotated entries.
//! let listing = "requests==2.26.0\n  certifi==2021.5.30\n";
//! let entries = PipenvGraphParser::new().parse(listing);
//! assert_eq!(entries.len(), 2);
//!
//! // Order packages so dependents come before their dependencies.
//! let ordered = order_packages(&entries, |_| true);
//! assert_eq!(ordered[0].package, "requests");
//!
//! // Resolve an abstract version to the concrete VCS label to fetch.
//! let config = PackageConfig {
//!     version_tag_format: Some("v%s".to_string()),
//!     ..Default::default()
//! };
//! let label = label::resolve("requests", &config, "2.26.0").unwrap();
//! assert_eq!(label.value, "v2.26.0");
//! ```
//!
//! ## Core Concepts
//!
//! The library is built around a few key concepts:
//!
//! - **Package Map (`config`)**: A JSON file mapping each package to its
//!   repository URL and to hints for turning release versions into tags or
//!   commits. The map accumulates knowledge across runs.
//! - **Version Labels (`label`)**: The translation from an abstract version
//!   string like `2.8.1` to the concrete tag or commit hash a repository
//!   must be synchronized to.
//! - **Synchronizers (`vcs`)**: Git and mercurial working-copy
//!   synchronization behind one trait. The git variant parks its `.git`
//!   directory as `.git-moved` between runs so the vendored tree can be
//!   checked into an outer repository.
//! - **Graph Ordering (`graph`)**: Parsing of reverse dependency listings
//!   and the depth-based ordering that decides install order.
//! - **Vendoring Engine (`vendor`)**: Coordinates source discovery, label
//!   resolution and synchronizer dispatch for a list of requirements.
//!
//! ## Execution Flow
//!
//! A full vendoring run executes the following high-level steps:
//!
//! 1. **Graph**: Obtain the project's reverse dependency listing and order
//!    it by dependency depth.
//! 2. **Discovery**: Look up repository URLs for packages the map does not
//!    know yet, via the package index.
//! 3. **Synchronization**: Bring each package's working copy to its
//!    resolved label, cloning only when the existing checkout does not
//!    match.
//! 4. **Script Output**: Write the install script that rebuilds the
//!    project's virtualenv from the vendored checkouts.
//!
//! Every step is fail-fast: the first fatal error aborts the run, leaving
//! already-synchronized packages on disk for the next attempt to reuse.

pub mod config;
pub mod defaults;
pub mod error;
pub mod graph;
pub mod index;
pub mod label;
pub mod output;
pub mod process;
pub mod requirements;
pub mod script;
pub mod setup_py;
pub mod vcs;
pub mod vendor;

#[cfg(test)]
mod graph_proptest;
