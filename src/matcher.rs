//! Glob matching for inclusion and ignore patterns.
//!
//! Patterns use shell-glob syntax: `*` stays within one path component,
//! `**` crosses directories, and `{a,b}` / `[ab]` classes are supported.
//!
//! Unlike shell globs, wildcards also match names starting with a dot:
//! `*.java` matches `.Hidden.java`, and `**/*` reaches into dot-directories.

use globset::{Glob, GlobBuilder, GlobMatcher, GlobSet, GlobSetBuilder};
use tracing::warn;

/// Build a single glob with path-aware `*` semantics.
fn build_glob(pattern: &str) -> Result<Glob, globset::Error> {
    GlobBuilder::new(pattern)
        .literal_separator(true)
        .backslash_escape(true)
        .build()
}

/// Compile an inclusion glob such as `**/*.java`.
pub fn compile_glob(pattern: &str) -> Result<GlobMatcher, globset::Error> {
    Ok(build_glob(pattern)?.compile_matcher())
}

/// A compiled set of ignore patterns.
///
/// Malformed patterns never match; they are logged and skipped so that
/// filtering stays total.
#[derive(Debug, Clone)]
pub struct IgnoreSet {
    set: GlobSet,
    len: usize,
}

impl IgnoreSet {
    pub fn new(patterns: &[String]) -> Self {
        let mut builder = GlobSetBuilder::new();
        let mut len = 0;

        for pattern in patterns {
            match build_glob(pattern) {
                Ok(glob) => {
                    builder.add(glob);
                    len += 1;
                }
                Err(e) => warn!("Skipping malformed ignore pattern '{}': {}", pattern, e),
            }
        }

        let set = builder.build().unwrap_or_else(|e| {
            warn!("Failed to build ignore set: {}. Nothing will be ignored.", e);
            GlobSet::empty()
        });

        Self { set, len }
    }

    /// Number of usable patterns in the set.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn is_ignored(&self, path: &str) -> bool {
        self.set.is_match(path)
    }
}

/// Drop every path matching any of `ignore_patterns`, keeping input order.
pub fn filter_ignored(paths: Vec<String>, ignore_patterns: &[String]) -> Vec<String> {
    if ignore_patterns.is_empty() {
        return paths;
    }

    let ignores = IgnoreSet::new(ignore_patterns);
    paths
        .into_iter()
        .filter(|p| !ignores.is_ignored(p))
        .collect()
}
