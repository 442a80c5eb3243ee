//! Change-set collection across the commits of a push.
//!
//! Each commit's touched paths come from `git diff-tree`, run through the
//! [`ProcessExecutor`] seam. Paths are deduplicated in first-seen order and
//! anything no longer present as a file in the working tree is dropped.

use std::collections::HashSet;
use std::path::Path;

use tracing::{debug, info};

use crate::error::DiffError;
use crate::process::ProcessExecutor;

use super::commits::Commit;

/// Binary used for diff queries.
pub const GIT_BINARY: &str = "git";

/// Arguments listing every path a single commit touched.
///
/// `--root` makes the first commit of a repository report its files, and
/// `-z` keeps unusual path names unquoted.
pub fn diff_tree_args(sha: &str) -> Vec<String> {
    [
        "diff-tree",
        "--no-commit-id",
        "--name-only",
        "-r",
        "--root",
        "-z",
        sha,
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

/// Split NUL-separated `diff-tree -z` output into paths.
///
/// Paths may themselves contain newlines, so only NUL separates entries.
fn parse_name_only(stdout: &str) -> Vec<String> {
    stdout
        .split('\0')
        .filter(|p| !p.is_empty())
        .map(str::to_string)
        .collect()
}

/// Ask the diff tool which paths one commit touched.
pub async fn diff_files_for_commit<E: ProcessExecutor + ?Sized>(
    executor: &E,
    root: &Path,
    sha: &str,
) -> Result<Vec<String>, DiffError> {
    let output = executor
        .capture_output(GIT_BINARY, &diff_tree_args(sha), root)
        .await
        .map_err(|source| DiffError::QueryFailed {
            sha: sha.to_string(),
            source,
        })?;

    Ok(parse_name_only(&output.stdout))
}

/// Collect the distinct paths touched by `commits` that still exist under `root`.
///
/// Commits are queried in input order and the first failing query aborts
/// collection. The result keeps the order in which each path was first seen.
pub async fn collect_changed_files<E: ProcessExecutor + ?Sized>(
    executor: &E,
    root: &Path,
    commits: &[Commit],
) -> Result<Vec<String>, DiffError> {
    let mut seen = HashSet::new();
    let mut ordered = Vec::new();

    for commit in commits {
        let paths = diff_files_for_commit(executor, root, &commit.sha).await?;
        debug!("Commit {} touched {:?}", short_sha(&commit.sha), paths);

        for path in paths {
            if seen.insert(path.clone()) {
                ordered.push(path);
            }
        }
    }

    let distinct = ordered.len();
    let existing: Vec<String> = ordered
        .into_iter()
        .filter(|p| is_regular_file(&root.join(p)))
        .collect();

    info!(
        "{} commits touched {} distinct paths, {} still present",
        commits.len(),
        distinct,
        existing.len()
    );

    Ok(existing)
}

/// A regular file, not following symlinks, matching what full scans select.
fn is_regular_file(path: &Path) -> bool {
    std::fs::symlink_metadata(path).is_ok_and(|m| m.file_type().is_file())
}

fn short_sha(sha: &str) -> &str {
    sha.get(..7).unwrap_or(sha)
}
