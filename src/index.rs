//! # Package Index Lookup
//!
//! When the package map has no repository URL for a package, the package
//! index's JSON metadata usually knows where the source lives. The lookup
//! is a heuristic: the home page field is trusted when it points at github,
//! and failing that the long description is scanned for the first github
//! link. Packages the heuristic cannot place are reported back to the user
//! for manual mapping rather than guessed at.

use std::sync::OnceLock;
use std::time::Duration;

use log::debug;
use regex::Regex;
use url::Url;

use crate::error::{Error, Result};

/// Index endpoint serving `/<package>/json` metadata documents.
pub const DEFAULT_INDEX_URL: &str = "https://pypi.python.org/pypi";

/// Per-lookup timeout. Index queries are small; anything slow is a network
/// problem worth surfacing quickly.
const LOOKUP_TIMEOUT: Duration = Duration::from_secs(30);

/// Answers "where does this package's source repository live?".
pub trait PackageIndex {
    /// The repository URL for `package`, or `None` when the index has no
    /// usable answer.
    fn repository_url(&self, package: &str) -> Result<Option<String>>;
}

/// [`PackageIndex`] backed by a PyPI-compatible JSON API.
pub struct PypiIndex {
    agent: ureq::Agent,
    base_url: String,
}

impl PypiIndex {
    pub fn new() -> Self {
        Self::with_base_url(DEFAULT_INDEX_URL)
    }

    /// Point the lookup at a different index, for mirrors and tests.
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        let agent = ureq::AgentBuilder::new().timeout(LOOKUP_TIMEOUT).build();
        Self {
            agent,
            base_url: base_url.into(),
        }
    }
}

impl Default for PypiIndex {
    fn default() -> Self {
        Self::new()
    }
}

impl PackageIndex for PypiIndex {
    fn repository_url(&self, package: &str) -> Result<Option<String>> {
        let endpoint = format!("{}/{}/json", self.base_url, package);
        debug!("querying package index: {}", endpoint);

        let response = match self.agent.get(&endpoint).call() {
            Ok(response) => response,
            // an unknown package is "no answer", not a failure
            Err(ureq::Error::Status(404, _)) => return Ok(None),
            Err(e) => {
                return Err(Error::Index {
                    package: package.to_string(),
                    message: e.to_string(),
                })
            }
        };

        let metadata: serde_json::Value = response.into_json().map_err(|e| Error::Index {
            package: package.to_string(),
            message: format!("invalid index response: {}", e),
        })?;

        Ok(extract_repository_url(&metadata))
    }
}

/// Pull a github repository URL out of a package's index metadata.
pub fn extract_repository_url(metadata: &serde_json::Value) -> Option<String> {
    let info = metadata.get("info")?;

    if let Some(home) = info.get("home_page").and_then(|v| v.as_str()) {
        if let Ok(mut parsed) = Url::parse(home) {
            if parsed.host_str() == Some("github.com")
                && matches!(parsed.scheme(), "http" | "https")
            {
                let _ = parsed.set_scheme("https");
                return Some(parsed.to_string());
            }
        }
    }

    let description = info.get("description").and_then(|v| v.as_str())?;
    description_pattern()
        .find(description)
        .map(|found| format!("https://{}", found.as_str()))
}

fn description_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"github\.com/[^/\s]+/[a-zA-Z0-9_-]+").expect("hard-coded pattern compiles")
    })
}
