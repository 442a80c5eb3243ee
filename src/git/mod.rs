//! Git access: push commits via git2 and per-commit diffs via the git CLI.

pub mod commits;
pub mod diff;
pub mod range;

pub use commits::{Commit, CommitAuthor, PushEvent, fetch_push_commits};
pub use diff::collect_changed_files;
pub use range::{PushRange, resolve_push_range};
