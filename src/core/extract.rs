//! Archive extraction
//!
//! Unpacks each fetched archive next to itself in the working directory.

use std::path::PathBuf;

use crate::core::fetch::FetchedArchive;
use crate::core::release::Package;
use crate::error::{BootstrapError, ExtractError};
use crate::infra::{archive, filesystem};

/// An unpacked source tree
#[derive(Debug, Clone)]
pub struct ExtractedSource {
    /// Which package the tree belongs to
    pub package: Package,
    /// Top-level source directory
    pub dir: PathBuf,
}

/// Unpack `archives` in order
///
/// A source directory left over from an earlier run is replaced.
pub async fn extract_archives(
    archives: &[FetchedArchive],
) -> Result<Vec<ExtractedSource>, BootstrapError> {
    let mut extracted = Vec::new();

    for fetched in archives {
        let work_dir = fetched
            .path
            .parent()
            .map(PathBuf::from)
            .unwrap_or_default();
        let dir = fetched.spec.source_dir(&work_dir);

        filesystem::remove_dir_all(&dir)?;
        tracing::info!("Extracting {}", fetched.path.display());

        let archive_path = fetched.path.clone();
        let dest = work_dir.clone();
        tokio::task::spawn_blocking(move || archive::unpack(&archive_path, &dest))
            .await
            .map_err(|e| ExtractError::Unpack {
                path: fetched.path.clone(),
                error: e.to_string(),
            })??;

        if !dir.is_dir() {
            return Err(ExtractError::MissingSourceDir {
                archive: fetched.path.clone(),
                expected: dir,
            }
            .into());
        }

        extracted.push(ExtractedSource {
            package: fetched.spec.package,
            dir,
        });
    }

    Ok(extracted)
}
