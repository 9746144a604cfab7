//! Post-install smoke check
//!
//! Imports the freshly built extension in a Python interpreter and reports
//! the library version it was built against.

use std::path::{Path, PathBuf};
use std::process::Stdio;

use serde::{Deserialize, Serialize};
use tokio::process::Command;

use crate::config::defaults::env;
use crate::core::build_env::library_search_path;
use crate::core::environment::EnvironmentRoot;
use crate::error::VerifyError;

/// Snippet run by the interpreter
pub const IMPORT_CHECK: &str = "import xapian; print(xapian.version_string())";

/// Interpreters looked up on `PATH` when the environment has none
const FALLBACK_INTERPRETERS: [&str; 2] = ["python3", "python"];

/// What an import failure does to the run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VerifyPolicy {
    /// Abort with a non-zero exit
    #[default]
    Fatal,
    /// Print a warning and succeed
    Warn,
}

/// Successful verification details
#[derive(Debug, Clone, Serialize)]
pub struct VerifyReport {
    /// Interpreter that imported the module
    pub interpreter: PathBuf,
    /// Version reported by `xapian.version_string()`
    pub version: String,
    /// Whether `version` equals the requested release
    pub matches_requested: bool,
    /// Compiled extension module found under `<root>/lib`, if any
    pub extension: Option<PathBuf>,
}

/// Pick the interpreter used for the import check
///
/// An explicit choice wins, then `<root>/bin/python`, then `python3` and
/// `python` on `PATH`.
pub fn resolve_interpreter(
    root: &EnvironmentRoot,
    configured: Option<&Path>,
) -> Result<PathBuf, VerifyError> {
    if let Some(configured) = configured {
        if configured.is_file() {
            return Ok(configured.to_path_buf());
        }
        return which::which(configured).map_err(|_| VerifyError::InterpreterNotFound);
    }

    let venv_python = root.bin_dir().join("python");
    if venv_python.is_file() {
        return Ok(venv_python);
    }

    FALLBACK_INTERPRETERS
        .iter()
        .find_map(|name| which::which(name).ok())
        .ok_or(VerifyError::InterpreterNotFound)
}

/// Import the bindings with `interpreter`
pub async fn verify_import(
    root: &EnvironmentRoot,
    interpreter: &Path,
    requested_version: &str,
) -> Result<VerifyReport, VerifyError> {
    let library_path = library_search_path(
        &root.lib_dir(),
        std::env::var_os(env::LD_LIBRARY_PATH).as_deref(),
    )?;

    tracing::info!("Importing xapian with {}", interpreter.display());
    let output = Command::new(interpreter)
        .arg("-c")
        .arg(IMPORT_CHECK)
        .env(env::LD_LIBRARY_PATH, library_path)
        .stdin(Stdio::null())
        .output()
        .await
        .map_err(|e| VerifyError::Spawn {
            interpreter: interpreter.to_path_buf(),
            error: e.to_string(),
        })?;

    if !output.status.success() {
        return Err(VerifyError::ImportFailed {
            interpreter: interpreter.to_path_buf(),
            stderr: last_line(&String::from_utf8_lossy(&output.stderr))
                .unwrap_or_else(|| output.status.to_string()),
        });
    }

    let version = last_line(&String::from_utf8_lossy(&output.stdout)).unwrap_or_default();
    let matches_requested = version == requested_version;
    if !matches_requested {
        tracing::warn!("Imported xapian {version}, expected {requested_version}");
    }

    Ok(VerifyReport {
        interpreter: interpreter.to_path_buf(),
        version,
        matches_requested,
        extension: find_extension(&root.lib_dir()),
    })
}

/// Locate the compiled `_xapian` module below `lib_dir`
pub fn find_extension(lib_dir: &Path) -> Option<PathBuf> {
    walkdir::WalkDir::new(lib_dir)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|e| e.file_type().is_file())
        .find(|e| is_extension_name(&e.file_name().to_string_lossy()))
        .map(walkdir::DirEntry::into_path)
}

fn is_extension_name(name: &str) -> bool {
    name.starts_with("_xapian")
        && [".so", ".pyd", ".dylib"]
            .iter()
            .any(|ext| name.ends_with(ext))
}

fn last_line(text: &str) -> Option<String> {
    text.lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .last()
        .map(ToString::to_string)
}
