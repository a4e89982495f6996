//! # Dependency Graph Parsing and Ordering
//!
//! `pipenv graph --reverse --bare` prints an indented listing in which a
//! package's nesting depth reflects how far it sits from a graph root. The
//! parser extracts `package==version` entries with their depths; the orderer
//! flattens them into a deterministic install order.
//!
//! The orderer sorts by each package's deepest observed position, which
//! lists a package before the packages it depends on. The generated install
//! script walks the listing front to back in that same order.

use std::collections::{BTreeSet, HashMap};
use std::sync::OnceLock;

use log::debug;
use regex::Regex;

use crate::requirements::Requirement;

/// One `package==version` occurrence in the graph listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GraphEntry {
    pub package: String,
    pub version: String,
    /// Nesting depth, two spaces of indentation per level.
    pub depth: usize,
}

impl GraphEntry {
    pub fn new(package: impl Into<String>, version: impl Into<String>, depth: usize) -> Self {
        Self {
            package: package.into(),
            version: version.into(),
            depth,
        }
    }
}

/// Extracts graph entries from a dependency listing.
///
/// Implementations never fail: a listing full of unrecognizable lines is
/// simply an empty graph.
pub trait GraphParser {
    fn parse(&self, text: &str) -> Vec<GraphEntry>;
}

/// Parser for the indented `pipenv graph --reverse --bare` format.
#[derive(Debug, Clone, Copy, Default)]
pub struct PipenvGraphParser;

impl PipenvGraphParser {
    pub fn new() -> Self {
        Self
    }
}

fn entry_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^(\s*)-?\s*([^=]+)==(\d+\.\d+(?:\.\d+)*)")
            .expect("hard-coded pattern compiles")
    })
}

impl GraphParser for PipenvGraphParser {
    fn parse(&self, text: &str) -> Vec<GraphEntry> {
        let mut entries = Vec::new();

        for line in text.lines() {
            match entry_pattern().captures(line) {
                Some(caps) => {
                    let indent = caps.get(1).map_or(0, |m| m.as_str().len());
                    entries.push(GraphEntry {
                        package: caps[2].trim().to_string(),
                        version: caps[3].to_string(),
                        depth: indent / 2,
                    });
                }
                None => {
                    if !line.trim().is_empty() {
                        debug!("ignoring graph line without a pinned package: {:?}", line);
                    }
                }
            }
        }

        entries
    }
}

/// Flatten graph entries into an ordered, deduplicated requirement list.
///
/// Each distinct `(package, version)` pair appears once, ordered by the
/// package's deepest observed graph position so that a package comes before
/// everything it depends on. Packages rejected by `should_vendor` are
/// dropped before ordering.
pub fn order_packages<F>(entries: &[GraphEntry], should_vendor: F) -> Vec<Requirement>
where
    F: Fn(&str) -> bool,
{
    let mut max_depths: HashMap<&str, usize> = HashMap::new();
    let mut pairs: BTreeSet<(&str, &str)> = BTreeSet::new();

    for entry in entries {
        let depth = max_depths.entry(entry.package.as_str()).or_insert(0);
        *depth = (*depth).max(entry.depth);
        pairs.insert((entry.package.as_str(), entry.version.as_str()));
    }

    let mut requirements: Vec<Requirement> = pairs
        .into_iter()
        .filter(|(package, _)| should_vendor(package))
        .map(|(package, version)| Requirement::new(package, version))
        .collect();

    // The set iterates in (package, version) order; the stable sort keeps
    // that as the tie-break within each depth.
    requirements.sort_by_key(|req| {
        max_depths
            .get(req.package.as_str())
            .copied()
            .unwrap_or(0)
    });

    requirements
}
