//! # Vendored Requirements Files
//!
//! Parsing for the `name=version` listing format that records which package
//! versions a project vendors. Note the single `=`: these files are written
//! and consumed by pipsource itself and are not pip requirements files.
//!
//! Blank lines and lines starting with `#` are skipped. Anything else that
//! does not split into exactly one name and one version is a hard error, so
//! a corrupted listing never silently vendors the wrong set.

use std::fs;
use std::path::Path;

use crate::error::{Error, Result};

/// One requested package at an exact version.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Requirement {
    pub package: String,
    pub version: String,
}

impl Requirement {
    pub fn new(package: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            package: package.into(),
            version: version.into(),
        }
    }
}

/// Parse a requirements listing, preserving line order.
pub fn parse(content: &str) -> Result<Vec<Requirement>> {
    let mut requirements = Vec::new();

    for line in content.lines() {
        if line.starts_with('#') || line.trim().is_empty() {
            continue;
        }

        let parts: Vec<&str> = line.split('=').collect();
        if parts.len() != 2 {
            return Err(Error::MalformedRequirement {
                line: line.to_string(),
            });
        }

        requirements.push(Requirement {
            package: parts[0].trim().to_string(),
            version: parts[1].trim().to_string(),
        });
    }

    Ok(requirements)
}

/// Read and parse a requirements listing from `path`.
pub fn from_file(path: &Path) -> Result<Vec<Requirement>> {
    let content = fs::read_to_string(path)?;
    parse(&content)
}
