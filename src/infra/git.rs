//! Git operations
//!
//! Clones a branch of a repository using the gix crate.

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Git operation errors
#[derive(Error, Debug)]
pub enum GitError {
    /// Failed to clone repository
    #[error("Failed to clone '{url}': {error}")]
    CloneFailed { url: String, error: String },

    /// Branch name rejected or missing on the remote
    #[error("Branch '{branch}' not usable for '{url}': {error}")]
    InvalidBranch {
        url: String,
        branch: String,
        error: String,
    },

    /// Failed to resolve HEAD after checkout
    #[error("Failed to resolve HEAD in '{path}': {error}")]
    ResolveFailed { path: PathBuf, error: String },
}

/// Result of a git clone operation
#[derive(Debug, Clone)]
pub struct CloneResult {
    /// Path to the cloned repository
    pub path: PathBuf,
    /// Commit SHA checked out
    pub commit_sha: String,
    /// Branch that was checked out
    pub branch: String,
}

/// Clone `url` into `dest` with `branch` checked out
///
/// `dest` must not exist yet; gix refuses to clone into a non-empty directory.
pub fn clone_branch(url: &str, branch: &str, dest: &Path) -> Result<CloneResult, GitError> {
    let clone_err = |e: &dyn std::fmt::Display| GitError::CloneFailed {
        url: url.to_string(),
        error: e.to_string(),
    };

    let prepare = gix::prepare_clone(url, dest).map_err(|e| clone_err(&e))?;
    let mut prepare = prepare
        .with_ref_name(Some(branch))
        .map_err(|e| GitError::InvalidBranch {
            url: url.to_string(),
            branch: branch.to_string(),
            error: e.to_string(),
        })?;

    let (mut checkout, _outcome) = prepare
        .fetch_then_checkout(gix::progress::Discard, &gix::interrupt::IS_INTERRUPTED)
        .map_err(|e| clone_err(&e))?;

    let (repo, _outcome) = checkout
        .main_worktree(gix::progress::Discard, &gix::interrupt::IS_INTERRUPTED)
        .map_err(|e| clone_err(&e))?;

    let commit_sha = repo
        .head_id()
        .map_err(|e| GitError::ResolveFailed {
            path: dest.to_path_buf(),
            error: e.to_string(),
        })?
        .to_hex()
        .to_string();

    Ok(CloneResult {
        path: dest.to_path_buf(),
        commit_sha,
        branch: branch.to_string(),
    })
}
