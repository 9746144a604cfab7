//! Environment guard and install layout
//!
//! Everything is installed beneath the active virtual environment, with the
//! same layout `./configure --prefix=<root>` produces.

use std::path::{Path, PathBuf};

use crate::config::defaults::{self, env};
use crate::error::EnvironmentError;

/// Root of the active virtual environment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvironmentRoot {
    root: PathBuf,
}

impl EnvironmentRoot {
    /// Read `VIRTUAL_ENV` from the process environment
    pub fn from_env() -> Result<Self, EnvironmentError> {
        Self::from_value(std::env::var_os(env::VIRTUAL_ENV).map(PathBuf::from))
    }

    /// Validate a `VIRTUAL_ENV` value
    ///
    /// Unset and empty are the same failure; a path that does not exist is a
    /// separate one.
    pub fn from_value(value: Option<PathBuf>) -> Result<Self, EnvironmentError> {
        let root = match value {
            Some(path) if !path.as_os_str().is_empty() => path,
            _ => return Err(EnvironmentError::NotActivated),
        };

        if !root.is_dir() {
            return Err(EnvironmentError::MissingRoot { path: root });
        }

        tracing::debug!("Environment root: {}", root.display());
        Ok(Self { root })
    }

    /// The install prefix
    pub fn path(&self) -> &Path {
        &self.root
    }

    /// `<root>/src`, where framework checkouts live
    pub fn src_dir(&self) -> PathBuf {
        self.root.join("src")
    }

    /// `<root>/lib`
    pub fn lib_dir(&self) -> PathBuf {
        self.root.join("lib")
    }

    /// `<root>/bin`
    pub fn bin_dir(&self) -> PathBuf {
        self.root.join("bin")
    }

    /// `<root>/packages`, holding archives and extracted sources
    pub fn work_dir(&self) -> PathBuf {
        self.root.join(defaults::PACKAGES_SUBDIR)
    }

    /// `<root>/packages/logs`
    pub fn logs_dir(&self) -> PathBuf {
        self.work_dir().join(defaults::LOGS_SUBDIR)
    }

    /// `<root>/bin/xapian-config`, installed by the core build
    pub fn xapian_config(&self) -> PathBuf {
        self.bin_dir().join("xapian-config")
    }
}
