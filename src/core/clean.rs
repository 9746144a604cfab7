//! Clean logic
//!
//! Removes the download and build scratch area under `<root>/packages`.
//! Installed files, the haystack checkout and the virtualenv itself are
//! never touched.

use std::path::PathBuf;

use serde::Serialize;

use crate::core::environment::EnvironmentRoot;
use crate::error::FilesystemError;
use crate::infra::filesystem;

/// Result of clean operation
#[derive(Debug, Default, Serialize)]
pub struct CleanResult {
    /// Directory that was removed, if it existed
    pub removed: Option<PathBuf>,
    /// Bytes freed
    pub freed_bytes: u64,
}

/// Remove archives, extracted sources and build logs
pub fn clean_work_dir(root: &EnvironmentRoot) -> Result<CleanResult, FilesystemError> {
    let work_dir = root.work_dir();
    if !work_dir.exists() {
        return Ok(CleanResult::default());
    }

    let freed_bytes = filesystem::dir_size(&work_dir);
    filesystem::remove_dir_all(&work_dir)?;
    tracing::info!("Removed {} ({freed_bytes} bytes)", work_dir.display());

    Ok(CleanResult {
        removed: Some(work_dir),
        freed_bytes,
    })
}

/// Check if the environment has anything to clean
pub fn has_work_dir(root: &EnvironmentRoot) -> bool {
    root.work_dir().exists()
}
