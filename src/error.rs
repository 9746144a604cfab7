//! Error types for xapian-bootstrap
//!
//! Domain-specific error types using thiserror. Each pipeline step has its
//! own enum; [`BootstrapError`] aggregates them for the pipeline driver.

use std::path::PathBuf;
use thiserror::Error;

/// Environment guard errors
#[derive(Error, Debug)]
pub enum EnvironmentError {
    /// `VIRTUAL_ENV` is unset or empty
    #[error("VIRTUAL_ENV is not set. Activate a virtual environment first.")]
    NotActivated,

    /// `VIRTUAL_ENV` points at a directory that does not exist
    #[error("VIRTUAL_ENV points to '{path}', which does not exist")]
    MissingRoot { path: PathBuf },

    /// The environment's lib directory cannot go into a search path
    #[error("Cannot add '{}' to LD_LIBRARY_PATH: {error}", path.display())]
    UnusableLibraryPath { path: PathBuf, error: String },
}

/// Download errors
#[derive(Error, Debug)]
pub enum DownloadError {
    /// Network error
    #[error("Network error downloading '{url}': {error}")]
    NetworkError { url: String, error: String },

    /// External transfer tool exited unsuccessfully
    #[error("{tool} failed downloading '{url}' ({status})")]
    ToolFailed {
        tool: String,
        url: String,
        status: String,
    },

    /// Requested transfer tool is not installed
    #[error("Transfer tool '{tool}' not found in PATH")]
    ToolUnavailable { tool: String },

    /// IO error
    #[error("IO error for '{path}': {error}")]
    IoError { path: PathBuf, error: String },

    /// Max retries exceeded
    #[error("Download failed after {retries} attempts: {url}")]
    MaxRetriesExceeded { url: String, retries: u32 },
}

/// Archive extraction errors
#[derive(Error, Debug)]
pub enum ExtractError {
    /// File extension is not a supported archive format
    #[error("Unsupported archive format: {path}")]
    UnsupportedFormat { path: PathBuf },

    /// Unpacking failed
    #[error("Failed to unpack '{path}': {error}")]
    Unpack { path: PathBuf, error: String },

    /// Archive did not produce the expected source directory
    #[error("Archive '{archive}' did not contain '{expected}'")]
    MissingSourceDir { archive: PathBuf, expected: PathBuf },
}

/// Build errors
#[derive(Error, Debug)]
pub enum BuildError {
    /// A configure/make/install stage exited unsuccessfully
    #[error("{package} {stage} failed ({status}); see {}", log.display())]
    StageFailed {
        package: String,
        stage: String,
        status: String,
        log: PathBuf,
    },

    /// A stage could not be started at all
    #[error("Could not run {stage} for {package}: {error}")]
    Spawn {
        package: String,
        stage: String,
        error: String,
    },

    /// Source directory missing (extract step skipped or failed)
    #[error("Source directory for {package} not found at '{}'", path.display())]
    MissingSource { package: String, path: PathBuf },

    #[error(transparent)]
    Environment(#[from] EnvironmentError),
}

/// Verification errors
#[derive(Error, Debug)]
pub enum VerifyError {
    /// No usable Python interpreter
    #[error("No Python interpreter found in the environment or PATH")]
    InterpreterNotFound,

    /// Interpreter ran but the import failed
    #[error("Xapian bindings failed to import using '{}': {stderr}", interpreter.display())]
    ImportFailed { interpreter: PathBuf, stderr: String },

    /// Interpreter could not be started
    #[error("Could not run '{}': {error}", interpreter.display())]
    Spawn { interpreter: PathBuf, error: String },

    #[error(transparent)]
    Environment(#[from] EnvironmentError),
}

/// Filesystem errors
#[derive(Error, Debug)]
pub enum FilesystemError {
    /// Failed to create directory
    #[error("Failed to create directory '{path}': {error}")]
    CreateDir { path: PathBuf, error: String },

    /// Failed to remove directory
    #[error("Failed to remove directory '{path}': {error}")]
    RemoveDir { path: PathBuf, error: String },

    /// Failed to read file
    #[error("Failed to read file '{path}': {error}")]
    ReadFile { path: PathBuf, error: String },
}

/// Top-level bootstrap error type
#[derive(Error, Debug)]
pub enum BootstrapError {
    /// Environment guard failed
    #[error(transparent)]
    Environment(#[from] EnvironmentError),

    /// Fetch step failed
    #[error("Download error: {0}")]
    Download(#[from] DownloadError),

    /// Extract step failed
    #[error("Extract error: {0}")]
    Extract(#[from] ExtractError),

    /// Build step failed
    #[error("Build error: {0}")]
    Build(#[from] BuildError),

    /// Verify step failed
    #[error(transparent)]
    Verify(#[from] VerifyError),

    /// Haystack clone failed
    #[error("Git error: {0}")]
    Git(#[from] crate::infra::git::GitError),

    /// Filesystem error
    #[error("Filesystem error: {0}")]
    Filesystem(#[from] FilesystemError),

    /// Settings error
    #[error("Configuration error: {0}")]
    Settings(#[from] crate::core::settings::SettingsError),
}
