//! pushfmt - reformat the files a push touched with an external formatter.
//!
//! # Overview
//!
//! A run selects files in a working tree (every file matching a glob, or the
//! files changed by the pushed commits), drops ignored paths, and hands the
//! rest to the formatter binary in fixed-size batches, one invocation at a
//! time. Committing the result back is left to the caller.

pub mod config;
pub mod error;
pub mod format;
pub mod git;
pub mod matcher;
pub mod pipeline;
pub mod process;
pub mod select;

// Re-export commonly used types
pub use config::FormatterConfiguration;
pub use error::{
    ConfigError, DiffError, FormatError, GitError, ProcessError, RunError, SelectionError, Stage,
};
pub use git::{Commit, CommitAuthor, PushEvent};
pub use pipeline::{RunInput, RunOutcome, RunReport, run};
pub use process::{CapturedOutput, ProcessExecutor, SystemExecutor};
