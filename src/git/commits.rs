//! Commits that triggered a formatting run.

use std::path::Path;

use chrono::{DateTime, TimeZone, Utc};
use git2::{Oid, Repository, Sort};
use serde::{Deserialize, Serialize};

use crate::error::GitError;

/// Author metadata attached to a pushed commit.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitAuthor {
    #[serde(default, alias = "username")]
    pub login: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

/// One revision of a push. Only `sha` is used for file selection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Commit {
    #[serde(alias = "id")]
    pub sha: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<CommitAuthor>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
}

impl Commit {
    pub fn new(sha: impl Into<String>) -> Self {
        Self {
            sha: sha.into(),
            author: None,
            timestamp: None,
        }
    }

    /// Create a Commit from a git2 Commit.
    pub fn from_git2_commit(commit: &git2::Commit) -> Self {
        let sig = commit.author();
        let author = CommitAuthor {
            login: None,
            name: sig.name().map(str::to_string),
            email: sig.email().map(str::to_string),
        };
        let timestamp = Utc.timestamp_opt(commit.time().seconds(), 0).single();

        Self {
            sha: commit.id().to_string(),
            author: Some(author),
            timestamp,
        }
    }
}

/// The parts of a push event payload needed for a run.
///
/// Accepts both `{"branch": "main"}` and the `{"ref": "refs/heads/main"}`
/// form, and commits keyed by either `sha` or `id`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PushEvent {
    #[serde(default)]
    branch: Option<String>,
    #[serde(default, rename = "ref")]
    git_ref: Option<String>,
    #[serde(default)]
    pub commits: Vec<Commit>,
}

impl PushEvent {
    pub fn from_json_file(path: &Path) -> Result<Self, GitError> {
        let content = std::fs::read_to_string(path).map_err(|source| GitError::ReadEvent {
            path: path.to_path_buf(),
            source,
        })?;

        serde_json::from_str(&content).map_err(|source| GitError::ParseEvent {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Branch the push went to, if the payload names one.
    pub fn branch(&self) -> Option<&str> {
        self.branch.as_deref().or_else(|| {
            self.git_ref
                .as_deref()
                .map(|r| r.strip_prefix("refs/heads/").unwrap_or(r))
        })
    }
}

/// List the commits reachable from `to` but not from `from`, oldest first.
///
/// With no `from`, only `to` itself is returned, matching a push that
/// created a branch.
pub fn fetch_push_commits(
    repo: &Repository,
    from: Option<Oid>,
    to: Oid,
) -> Result<Vec<Commit>, GitError> {
    let Some(from) = from else {
        let commit = repo.find_commit(to).map_err(GitError::ParseCommit)?;
        return Ok(vec![Commit::from_git2_commit(&commit)]);
    };

    let mut revwalk = repo.revwalk().map_err(GitError::RevwalkError)?;
    revwalk
        .set_sorting(Sort::TOPOLOGICAL | Sort::REVERSE)
        .map_err(GitError::RevwalkError)?;
    revwalk.push(to).map_err(GitError::RevwalkError)?;
    revwalk.hide(from).map_err(GitError::RevwalkError)?;

    let mut commits = Vec::new();
    for oid_result in revwalk {
        let oid = oid_result.map_err(GitError::RevwalkError)?;
        let commit = repo.find_commit(oid).map_err(GitError::ParseCommit)?;
        commits.push(Commit::from_git2_commit(&commit));
    }

    Ok(commits)
}
