//! Decide which files a run formats.

use std::path::Path;

use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::config::FormatterConfiguration;
use crate::error::{ConfigError, SelectionError};
use crate::git::{Commit, collect_changed_files};
use crate::matcher::{compile_glob, filter_ignored};
use crate::process::ProcessExecutor;

/// How candidate files are found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selection<'a> {
    /// Files touched by these commits.
    ChangedFiles(&'a [Commit]),
    /// Every regular file under the root matching this glob.
    FullScan(&'a str),
}

impl<'a> Selection<'a> {
    /// Pick the selection mode for `config`.
    ///
    /// Incremental mode without a commit list is rejected here, before any
    /// selection work starts. An empty list is valid and selects nothing.
    pub fn from_config(
        config: &'a FormatterConfiguration,
        commits: Option<&'a [Commit]>,
    ) -> Result<Self, ConfigError> {
        if config.only_format_changed_files {
            commits
                .map(Selection::ChangedFiles)
                .ok_or(ConfigError::MissingCommits)
        } else {
            Ok(Selection::FullScan(&config.glob))
        }
    }
}

/// Produce the final list of files to format under `root`.
///
/// Changed-files mode keeps the first-seen order across commits. Full-scan
/// mode returns paths in lexical order. Ignore patterns are applied last.
pub async fn select_files<E: ProcessExecutor + ?Sized>(
    executor: &E,
    root: &Path,
    selection: Selection<'_>,
    ignores: &[String],
) -> Result<Vec<String>, SelectionError> {
    let candidates = match selection {
        Selection::ChangedFiles(commits) => collect_changed_files(executor, root, commits).await?,
        Selection::FullScan(glob) => scan_files(root, glob)?,
    };
    debug!("Candidate files: {:?}", candidates);

    let candidate_count = candidates.len();
    let selected = filter_ignored(candidates, ignores);

    info!(
        "Selected {} of {} candidate files ({} ignore patterns)",
        selected.len(),
        candidate_count,
        ignores.len()
    );

    Ok(selected)
}

/// List regular files under `root` whose relative path matches `glob`.
///
/// Paths use `/` separators and are sorted lexically. `.git` directories are
/// never entered and symlinks are not followed.
pub fn scan_files(root: &Path, glob: &str) -> Result<Vec<String>, SelectionError> {
    let matcher = compile_glob(glob).map_err(|source| SelectionError::InvalidGlob {
        pattern: glob.to_string(),
        source,
    })?;

    let walker = WalkDir::new(root)
        .min_depth(1)
        .into_iter()
        .filter_entry(|e| !(e.file_type().is_dir() && e.file_name() == ".git"));

    let mut files = Vec::new();
    for entry in walker {
        let entry = entry.map_err(|source| SelectionError::ScanFailed {
            root: root.to_path_buf(),
            source,
        })?;

        if !entry.file_type().is_file() {
            continue;
        }

        let Some(relative) = relative_path(root, entry.path()) else {
            warn!("Skipping non UTF-8 path {:?}", entry.path());
            continue;
        };

        if matcher.is_match(&relative) {
            files.push(relative);
        }
    }

    files.sort();
    Ok(files)
}

/// `path` relative to `root`, joined with `/`.
fn relative_path(root: &Path, path: &Path) -> Option<String> {
    let relative = path.strip_prefix(root).ok()?;
    let parts: Option<Vec<&str>> = relative.components().map(|c| c.as_os_str().to_str()).collect();
    Some(parts?.join("/"))
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;
    use crate::process::{CapturedOutput, MockProcessExecutor};

    fn touch(root: &Path, paths: &[&str]) {
        for path in paths {
            let full = root.join(path);
            if let Some(parent) = full.parent() {
                fs::create_dir_all(parent).unwrap();
            }
            fs::write(full, "").unwrap();
        }
    }

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn no_processes() -> MockProcessExecutor {
        let mut mock = MockProcessExecutor::new();
        mock.expect_capture_output().never();
        mock.expect_run_to_completion().never();
        mock
    }

    // ============================================
    // Mode Selection Tests
    // ============================================

    #[test]
    fn test_changed_mode_requires_commits() {
        let config = FormatterConfiguration {
            only_format_changed_files: true,
            ..Default::default()
        };
        assert!(matches!(
            Selection::from_config(&config, None),
            Err(ConfigError::MissingCommits)
        ));
    }

    #[test]
    fn test_changed_mode_accepts_empty_commits() {
        let config = FormatterConfiguration {
            only_format_changed_files: true,
            ..Default::default()
        };
        let commits: Vec<Commit> = Vec::new();
        assert_eq!(
            Selection::from_config(&config, Some(&commits)).unwrap(),
            Selection::ChangedFiles(&[])
        );
    }

    #[test]
    fn test_full_scan_ignores_commits() {
        let config = FormatterConfiguration {
            glob: "*.java".to_string(),
            ..Default::default()
        };
        let commits = vec![Commit::new("c1")];
        assert_eq!(
            Selection::from_config(&config, Some(&commits)).unwrap(),
            Selection::FullScan("*.java")
        );
    }

    // ============================================
    // Full Scan Tests
    // ============================================

    #[test]
    fn test_scan_matches_glob_in_lexical_order() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), &["ws.java", "main.cpp", "main.java"]);

        let files = scan_files(dir.path(), "*.java").unwrap();
        assert_eq!(files, strings(&["main.java", "ws.java"]));
    }

    #[test]
    fn test_scan_star_stays_at_top_level() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), &["Top.java", "src/Nested.java"]);

        let files = scan_files(dir.path(), "*.java").unwrap();
        assert_eq!(files, strings(&["Top.java"]));
    }

    #[test]
    fn test_scan_recursive_glob_full_path_order() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), &["b.java", "a/z.java", "a.java", "a/b/c.java"]);

        let files = scan_files(dir.path(), "**/*.java").unwrap();
        assert_eq!(files, strings(&["a.java", "a/b/c.java", "a/z.java", "b.java"]));
    }

    #[test]
    fn test_scan_excludes_directories_and_git() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), &[".git/HEAD", ".git/objects/ab/cdef", "src/A.java"]);
        fs::create_dir_all(dir.path().join("empty.java")).unwrap();

        let files = scan_files(dir.path(), "**/*").unwrap();
        assert_eq!(files, strings(&["src/A.java"]));
    }

    #[test]
    fn test_scan_zero_matches_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), &["README.md"]);

        assert!(scan_files(dir.path(), "**/*.java").unwrap().is_empty());
    }

    #[test]
    fn test_scan_invalid_glob() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            scan_files(dir.path(), "[*.java"),
            Err(SelectionError::InvalidGlob { .. })
        ));
    }

    #[test]
    fn test_scan_missing_root_fails() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing");
        assert!(matches!(
            scan_files(&missing, "**/*"),
            Err(SelectionError::ScanFailed { .. })
        ));
    }

    #[test]
    fn test_scan_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), &["x/1.java", "x/2.java", "y.java", "z.txt"]);

        let first = scan_files(dir.path(), "**/*.java").unwrap();
        let second = scan_files(dir.path(), "**/*.java").unwrap();
        assert_eq!(first, second);
    }

    // ============================================
    // select_files Tests
    // ============================================

    #[tokio::test]
    async fn test_select_full_scan_applies_ignores() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), &["src/A.java", "generated/G.java", "src/B.java"]);

        let files = select_files(
            &no_processes(),
            dir.path(),
            Selection::FullScan("**/*.java"),
            &strings(&["generated/**"]),
        )
        .await
        .unwrap();

        assert_eq!(files, strings(&["src/A.java", "src/B.java"]));
    }

    #[tokio::test]
    async fn test_select_changed_files_applies_ignores() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), &["same.java", "d1.java", "d2.java"]);

        let mut mock = MockProcessExecutor::new();
        mock.expect_capture_output()
            .times(2)
            .returning(|_, args, _| {
                let stdout = match args.last().map(String::as_str) {
                    Some("c1") => "same.java\0d1.java\0",
                    Some("c2") => "same.java\0d2.java\0",
                    _ => "",
                };
                Ok(CapturedOutput {
                    stdout: stdout.to_string(),
                    stderr: String::new(),
                })
            });

        let commits = vec![Commit::new("c1"), Commit::new("c2")];
        let files = select_files(
            &mock,
            dir.path(),
            Selection::ChangedFiles(&commits),
            &strings(&["d*.java"]),
        )
        .await
        .unwrap();

        assert_eq!(files, strings(&["same.java"]));
    }

    #[tokio::test]
    async fn test_select_ignoring_everything_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), &["a.java", "b/c.java"]);

        let files = select_files(
            &no_processes(),
            dir.path(),
            Selection::FullScan("**/*"),
            &strings(&["**"]),
        )
        .await
        .unwrap();

        assert!(files.is_empty());
    }

    #[tokio::test]
    async fn test_select_empty_commit_list_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), &["a.java"]);

        let files = select_files(&no_processes(), dir.path(), Selection::ChangedFiles(&[]), &[])
            .await
            .unwrap();

        assert!(files.is_empty());
    }

    #[test]
    fn test_relative_path_uses_forward_slashes() {
        let root = Path::new("/repo");
        let path = root.join("src").join("main").join("A.java");
        assert_eq!(relative_path(root, &path).as_deref(), Some("src/main/A.java"));
    }
}
