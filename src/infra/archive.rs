//! Source archive unpacking
//!
//! Gzip-compressed and plain tarballs, unpacked with the `tar` crate.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use flate2::read::GzDecoder;

use crate::error::ExtractError;

/// Supported archive formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveFormat {
    /// `.tar.gz` / `.tgz`
    TarGz,
    /// `.tar`
    Tar,
}

impl ArchiveFormat {
    /// Detect the format from a file name
    pub fn from_path(path: &Path) -> Option<Self> {
        let name = path.file_name()?.to_str()?.to_ascii_lowercase();
        if name.ends_with(".tar.gz") || name.ends_with(".tgz") {
            Some(Self::TarGz)
        } else if name.ends_with(".tar") {
            Some(Self::Tar)
        } else {
            None
        }
    }
}

/// Unpack `archive` into `dest`
pub fn unpack(archive: &Path, dest: &Path) -> Result<(), ExtractError> {
    let format = ArchiveFormat::from_path(archive).ok_or_else(|| ExtractError::UnsupportedFormat {
        path: archive.to_path_buf(),
    })?;

    let unpack_err = |e: std::io::Error| ExtractError::Unpack {
        path: archive.to_path_buf(),
        error: e.to_string(),
    };

    let file = BufReader::new(File::open(archive).map_err(unpack_err)?);
    let reader: Box<dyn Read> = match format {
        ArchiveFormat::TarGz => Box::new(GzDecoder::new(file)),
        ArchiveFormat::Tar => Box::new(file),
    };

    std::fs::create_dir_all(dest).map_err(unpack_err)?;

    let mut tarball = tar::Archive::new(reader);
    tarball.set_preserve_permissions(true);
    tarball.unpack(dest).map_err(unpack_err)
}
