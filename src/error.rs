//! Error types for pushfmt modules using thiserror.

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// Errors from spawning and waiting on external processes.
#[derive(Error, Debug)]
pub enum ProcessError {
    #[error("Failed to spawn '{program}': {source}")]
    SpawnFailed {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("'{program}' timed out after {after:?}")]
    Timeout { program: String, after: Duration },

    #[error("'{program}' exited with code {code}: {stderr}")]
    NonZeroExit {
        program: String,
        code: i32,
        stderr: String,
    },
}

/// Errors from git operations.
#[derive(Error, Debug)]
pub enum GitError {
    #[error("Failed to open repository: {0}")]
    OpenRepository(#[source] git2::Error),

    #[error("Failed to find reference '{0}': {1}")]
    ReferenceNotFound(String, #[source] git2::Error),

    #[error("Failed to parse commit: {0}")]
    ParseCommit(#[source] git2::Error),

    #[error("Failed to walk commit history: {0}")]
    RevwalkError(#[source] git2::Error),

    #[error("Failed to read push event {path:?}: {source}")]
    ReadEvent {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Push event {path:?} is not valid JSON: {source}")]
    ParseEvent {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Invalid or contradictory run configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read configuration {path:?}: {source}")]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Configuration {path:?} is invalid: {source}")]
    ParseFailed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("filesToFormatPerSlice must be at least 1")]
    ZeroSliceSize,

    #[error("Invalid glob '{pattern}': {source}")]
    InvalidGlob {
        pattern: String,
        #[source]
        source: globset::Error,
    },

    #[error("onlyFormatChangedFiles is set but no commits were supplied")]
    MissingCommits,

    #[error("Working tree root {0:?} is not a directory")]
    InvalidRoot(PathBuf),
}

/// Errors while deciding which files to format.
#[derive(Error, Debug)]
pub enum SelectionError {
    #[error("Invalid glob '{pattern}': {source}")]
    InvalidGlob {
        pattern: String,
        #[source]
        source: globset::Error,
    },

    #[error("Failed to scan {root:?}: {source}")]
    ScanFailed {
        root: PathBuf,
        #[source]
        source: walkdir::Error,
    },

    #[error(transparent)]
    Diff(#[from] DiffError),
}

/// A diff query for one commit failed.
#[derive(Error, Debug)]
pub enum DiffError {
    #[error("git diff-tree failed for commit {sha}: {source}")]
    QueryFailed {
        sha: String,
        #[source]
        source: ProcessError,
    },
}

/// Errors from the batch formatter.
#[derive(Error, Debug)]
pub enum FormatError {
    #[error(
        "Formatter binary '{0}' not found. Pass --formatter with the path to the formatter script."
    )]
    NotInstalled(String),

    #[error("Failed to write style configuration to {path:?}: {source}")]
    StyleWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Formatter failed on batch {batch} of {total}: {source}")]
    BatchFailed {
        /// 1-based number of the failing batch.
        batch: usize,
        total: usize,
        #[source]
        source: ProcessError,
    },
}

impl FormatError {
    /// Number of batches that finished before this failure.
    pub fn batches_completed(&self) -> usize {
        match self {
            FormatError::BatchFailed { batch, .. } => batch.saturating_sub(1),
            _ => 0,
        }
    }
}

/// Pipeline stage a run failed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Configuration,
    Selection,
    DiffCollection,
    Formatting,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Configuration => "configuration",
            Stage::Selection => "selection",
            Stage::DiffCollection => "diff collection",
            Stage::Formatting => "formatting",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Terminal failure of a formatting run.
#[derive(Error, Debug)]
pub enum RunError {
    #[error("Run failed during configuration: {0}")]
    Configuration(#[from] ConfigError),

    #[error("Run failed during selection: {0}")]
    Selection(#[source] SelectionError),

    #[error("Run failed during diff collection: {0}")]
    DiffCollection(#[source] DiffError),

    #[error(
        "Run failed during formatting after {} of {total_batches} batches: {source}",
        .source.batches_completed()
    )]
    Formatting {
        total_batches: usize,
        #[source]
        source: FormatError,
    },
}

impl RunError {
    pub fn stage(&self) -> Stage {
        match self {
            RunError::Configuration(_) => Stage::Configuration,
            RunError::Selection(_) => Stage::Selection,
            RunError::DiffCollection(_) => Stage::DiffCollection,
            RunError::Formatting { .. } => Stage::Formatting,
        }
    }

    /// Batches that completed before the run failed. Zero for failures before formatting.
    pub fn batches_completed(&self) -> usize {
        match self {
            RunError::Formatting { source, .. } => source.batches_completed(),
            _ => 0,
        }
    }
}

impl From<SelectionError> for RunError {
    fn from(err: SelectionError) -> Self {
        match err {
            SelectionError::Diff(diff) => RunError::DiffCollection(diff),
            other => RunError::Selection(other),
        }
    }
}
