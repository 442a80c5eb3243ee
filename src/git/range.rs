//! Push range resolution.

use git2::{Oid, Repository};

use crate::error::GitError;

/// Resolved push range. `from` is absent for a push that created the branch.
#[derive(Debug, Clone)]
pub struct PushRange {
    pub from: Option<Oid>,
    pub to: Oid,
    pub to_ref: String,
}

/// Resolve the `before` and `after` references of a push.
///
/// If `to` is None, uses HEAD. A `from` of all zeros, the value hosting
/// platforms send for a newly created branch, is treated as absent.
pub fn resolve_push_range(
    repo: &Repository,
    from: Option<&str>,
    to: Option<&str>,
) -> Result<PushRange, GitError> {
    let to_ref = to.unwrap_or("HEAD");
    let to_oid = resolve_reference(repo, to_ref)?;

    let from_oid = match from {
        Some(reference) if !is_null_sha(reference) => Some(resolve_reference(repo, reference)?),
        _ => None,
    };

    Ok(PushRange {
        from: from_oid,
        to: to_oid,
        to_ref: to_ref.to_string(),
    })
}

fn is_null_sha(reference: &str) -> bool {
    !reference.is_empty() && reference.chars().all(|c| c == '0')
}

/// Resolve a reference (tag, branch, commit hash) to a commit OID.
pub fn resolve_reference(repo: &Repository, reference: &str) -> Result<Oid, GitError> {
    // Try as a direct OID first
    if let Ok(oid) = Oid::from_str(reference)
        && repo.find_commit(oid).is_ok()
    {
        return Ok(oid);
    }

    // Try as a reference (branch or tag)
    if let Ok(obj) = repo.revparse_single(reference) {
        return Ok(obj.peel_to_commit().map_err(GitError::ParseCommit)?.id());
    }

    Err(GitError::ReferenceNotFound(
        reference.to_string(),
        git2::Error::from_str("Reference not found"),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_null_sha_detection() {
        assert!(is_null_sha("0000000000000000000000000000000000000000"));
        assert!(!is_null_sha(""));
        assert!(!is_null_sha("a000000"));
    }
}
