//! Haystack checkout
//!
//! Clones the search framework into `<root>/src/haystack`. An existing
//! directory is left alone, so running the bootstrap twice never re-clones.

use std::path::PathBuf;

use crate::core::environment::EnvironmentRoot;
use crate::error::BootstrapError;
use crate::infra::filesystem;
use crate::infra::git::{self, CloneResult, GitError};

/// Checkout directory name under `<root>/src`
pub const CHECKOUT_DIR: &str = "haystack";

/// What the clone step did
#[derive(Debug, Clone)]
pub enum CloneOutcome {
    /// A fresh clone was made
    Cloned(CloneResult),
    /// The directory already existed
    Skipped { path: PathBuf },
}

impl CloneOutcome {
    /// Checkout location
    pub fn path(&self) -> &PathBuf {
        match self {
            Self::Cloned(result) => &result.path,
            Self::Skipped { path } => path,
        }
    }
}

/// `<root>/src/haystack`
pub fn checkout_path(root: &EnvironmentRoot) -> PathBuf {
    root.src_dir().join(CHECKOUT_DIR)
}

/// Clone `repository` at `branch` unless the checkout directory exists
pub async fn ensure_checkout(
    root: &EnvironmentRoot,
    repository: &str,
    branch: &str,
) -> Result<CloneOutcome, BootstrapError> {
    let dest = checkout_path(root);
    if dest.exists() {
        tracing::info!("{} already exists, skipping clone", dest.display());
        return Ok(CloneOutcome::Skipped { path: dest });
    }

    filesystem::create_dir_all(&root.src_dir())?;
    tracing::info!("Cloning {repository} ({branch}) into {}", dest.display());

    let url = repository.to_string();
    let branch = branch.to_string();
    let target = dest.clone();
    let result = tokio::task::spawn_blocking(move || git::clone_branch(&url, &branch, &target))
        .await
        .map_err(|e| GitError::CloneFailed {
            url: repository.to_string(),
            error: e.to_string(),
        })?;

    match result {
        Ok(result) => Ok(CloneOutcome::Cloned(result)),
        Err(e) => {
            // gix leaves a partial directory behind, which would make the next run skip
            let _ = filesystem::remove_dir_all(&dest);
            Err(e.into())
        }
    }
}
