//! Shared test utilities for integration and E2E tests.
//!
//! This module provides common fixtures, helper functions, and macros
//! to reduce duplication across test files.
//!
//! ## Usage
//!
//! Add `mod common;` to your test file, then use the helpers:
//!
//! ```rust,ignore
//! mod common;
//! use common::prelude::*;
//!
//! #[test]
//! fn test_example() {
//!     let fixture = TestFixture::new().with_minimal_config();
//!     // ... test code
//! }
//! ```

use assert_fs::prelude::*;
use std::path::Path;

/// Re-export commonly used test dependencies for convenience.
pub mod prelude {
    pub use assert_cmd::cargo::cargo_bin_cmd;
    pub use assert_fs::prelude::*;
    #[allow(unused_imports)]
    pub use assert_fs::TempDir;
    pub use predicates::prelude::*;

    #[allow(unused_imports)]
    pub use super::configs;
    #[allow(unused_imports)]
    pub use super::git;
    #[allow(unused_imports)]
    pub use super::GitUpstream;
    pub use super::TestFixture;
}

/// Common package map JSON snippets for testing.
#[allow(dead_code)]
pub mod configs {
    /// Minimal valid map with one git-backed package and an explicit tag.
    pub const MINIMAL: &str = r#"{
  "packages": {
    "ansicolors": {
      "git": "https://github.com/jonathaneunice/colors",
      "version-tags": {"1.1.8": "1.1.8"}
    }
  }
}"#;

    /// Map using a tag format template instead of per-version tags.
    pub const WITH_TAG_FORMAT: &str = r#"{
  "packages": {
    "requests": {
      "git": "https://github.com/psf/requests",
      "version-tag-format": "v%s"
    }
  }
}"#;

    /// Map marking one package as never vendored.
    pub const WITH_SKIP: &str = r#"{
  "packages": {
    "requests": {
      "git": "https://github.com/psf/requests",
      "version-tag-format": "v%s"
    },
    "pip": {
      "skip-vendor": true
    }
  }
}"#;

    /// Invalid JSON for error testing.
    pub const INVALID_JSON: &str = "{not valid json";

    /// Valid JSON that is not a package map.
    pub const NOT_A_MAP: &str = r#"{"pkgs": []}"#;

    /// Empty but valid package map.
    pub const EMPTY: &str = r#"{"packages": {}}"#;
}

/// A test fixture that provides a temporary project directory.
///
/// This struct simplifies the common pattern of creating a temp directory
/// and populating it with a package map, a requirements file, or a
/// dependency graph listing.
///
/// # Example
///
/// ```rust,ignore
/// let fixture = TestFixture::new()
///     .with_config(configs::MINIMAL)
///     .with_graph("requests==2.8.1\n");
///
/// let mut cmd = fixture.command();
/// cmd.arg("vendor").arg(".").assert().success();
/// ```
pub struct TestFixture {
    temp_dir: assert_fs::TempDir,
}

impl TestFixture {
    /// Create a new test fixture with an empty temporary directory.
    pub fn new() -> Self {
        Self {
            temp_dir: assert_fs::TempDir::new().expect("Failed to create temp directory"),
        }
    }

    /// Add a `config.json` package map with the given content.
    pub fn with_config(self, content: &str) -> Self {
        self.temp_dir
            .child("config.json")
            .write_str(content)
            .expect("Failed to write config file");
        self
    }

    /// Add the minimal valid package map.
    #[allow(dead_code)]
    pub fn with_minimal_config(self) -> Self {
        self.with_config(configs::MINIMAL)
    }

    /// Add a `requirements.txt` file with the given content.
    #[allow(dead_code)]
    pub fn with_requirements(self, content: &str) -> Self {
        self.temp_dir
            .child("requirements.txt")
            .write_str(content)
            .expect("Failed to write requirements file");
        self
    }

    /// Add a `graph.txt` dependency listing with the given content.
    #[allow(dead_code)]
    pub fn with_graph(self, content: &str) -> Self {
        self.temp_dir
            .child("graph.txt")
            .write_str(content)
            .expect("Failed to write graph file");
        self
    }

    /// Add a file with the given path and content.
    #[allow(dead_code)]
    pub fn with_file(self, path: &str, content: &str) -> Self {
        self.temp_dir
            .child(path)
            .write_str(content)
            .expect("Failed to write file");
        self
    }

    /// Get the path to the temporary directory.
    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Get the path to the package map file.
    pub fn config_path(&self) -> std::path::PathBuf {
        self.temp_dir.path().join("config.json")
    }

    /// Get the path to the requirements file.
    #[allow(dead_code)]
    pub fn requirements_path(&self) -> std::path::PathBuf {
        self.temp_dir.path().join("requirements.txt")
    }

    /// Get the path to the graph listing file.
    #[allow(dead_code)]
    pub fn graph_path(&self) -> std::path::PathBuf {
        self.temp_dir.path().join("graph.txt")
    }

    /// Get the vendor root used by tests in this fixture.
    #[allow(dead_code)]
    pub fn vendor_root(&self) -> std::path::PathBuf {
        self.temp_dir.path().join("vendor")
    }

    /// Get access to the underlying TempDir for advanced usage.
    #[allow(dead_code)]
    pub fn temp_dir(&self) -> &assert_fs::TempDir {
        &self.temp_dir
    }

    /// Create a child path in the temp directory.
    #[allow(dead_code)]
    pub fn child(&self, path: &str) -> assert_fs::fixture::ChildPath {
        self.temp_dir.child(path)
    }
}

impl Default for TestFixture {
    fn default() -> Self {
        Self::new()
    }
}

impl TestFixture {
    /// Create a command configured to run in this fixture's directory.
    ///
    /// Environment overrides for config and vendor locations are cleared
    /// so tests stay hermetic regardless of the caller's shell.
    pub fn command(&self) -> assert_cmd::Command {
        let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("pipsource");
        cmd.current_dir(self.path());
        cmd.env_remove("PIPSOURCE_CONFIG");
        cmd.env_remove("PIPSOURCE_VENDOR");
        cmd
    }
}

/// Run a git command in `dir`, panicking on failure.
///
/// Commit identity is injected through the environment so the tests do
/// not depend on the machine's global git configuration.
#[allow(dead_code)]
pub fn git(dir: &Path, args: &[&str]) -> String {
    let output = std::process::Command::new("git")
        .args(args)
        .current_dir(dir)
        .env("GIT_AUTHOR_NAME", "pipsource tests")
        .env("GIT_AUTHOR_EMAIL", "tests@pipsource.invalid")
        .env("GIT_COMMITTER_NAME", "pipsource tests")
        .env("GIT_COMMITTER_EMAIL", "tests@pipsource.invalid")
        .output()
        .expect("git should be installed for integration tests");
    assert!(
        output.status.success(),
        "git {:?} failed: {}",
        args,
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8_lossy(&output.stdout).trim().to_string()
}

/// A local git repository that serves as a clone source for tests.
///
/// Each release is one commit touching `version.txt`, tagged with the
/// release's tag name. The repository is reachable over a `file://` URL,
/// which supports both shallow tag clones and full-history clones.
#[allow(dead_code)]
pub struct GitUpstream {
    dir: assert_fs::TempDir,
}

#[allow(dead_code)]
impl GitUpstream {
    /// Create a repository with one tagged commit per `(tag, content)` pair.
    pub fn with_releases(releases: &[(&str, &str)]) -> Self {
        let dir = assert_fs::TempDir::new().expect("Failed to create upstream directory");
        git(dir.path(), &["init", "--quiet"]);
        let upstream = Self { dir };
        for (tag, content) in releases {
            upstream.tag_release(tag, content);
        }
        upstream
    }

    /// Commit new content for `version.txt` and tag it.
    pub fn tag_release(&self, tag: &str, content: &str) {
        std::fs::write(self.dir.path().join("version.txt"), content)
            .expect("Failed to write release file");
        git(self.dir.path(), &["add", "version.txt"]);
        git(
            self.dir.path(),
            &["commit", "--quiet", "-m", &format!("release {tag}")],
        );
        git(self.dir.path(), &["tag", tag]);
    }

    /// The clone URL for this repository.
    pub fn url(&self) -> String {
        format!("file://{}", self.dir.path().display())
    }

    /// Resolve a revision to its full commit hash.
    pub fn rev_parse(&self, rev: &str) -> String {
        git(self.dir.path(), &["rev-parse", rev])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixture_creates_temp_dir() {
        let fixture = TestFixture::new();
        assert!(fixture.path().exists());
    }

    #[test]
    fn test_fixture_with_config() {
        let fixture = TestFixture::new().with_config(configs::EMPTY);
        assert!(fixture.config_path().exists());
    }

    #[test]
    fn test_fixture_with_file() {
        let fixture = TestFixture::new().with_file("test.txt", "hello");
        assert!(fixture.path().join("test.txt").exists());
    }

    #[test]
    fn test_configs_are_valid_json() {
        // Verify that our map constants are valid JSON
        let configs = [
            configs::MINIMAL,
            configs::WITH_TAG_FORMAT,
            configs::WITH_SKIP,
            configs::NOT_A_MAP,
            configs::EMPTY,
        ];

        for config in configs {
            serde_json::from_str::<serde_json::Value>(config).expect("Config should be valid JSON");
        }
    }

    #[test]
    fn test_invalid_json_is_actually_invalid() {
        let result = serde_json::from_str::<serde_json::Value>(configs::INVALID_JSON);
        assert!(result.is_err(), "INVALID_JSON should not parse");
    }
}
