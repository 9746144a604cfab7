//! Transfer tool selection
//!
//! Archives are fetched with `curl` when it is installed, otherwise `wget`.
//! When neither is on `PATH` the built-in reqwest client is used.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tokio::process::Command;

use crate::error::DownloadError;
use crate::infra::download::DownloadManager;

/// A mechanism able to download a URL to a file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransferTool {
    /// `curl -fsSL -o <dest> <url>`
    Curl,
    /// `wget -q -O <dest> <url>`
    Wget,
    /// In-process HTTP client
    Builtin,
}

impl TransferTool {
    /// Probe order for external tools
    pub const PROBE_ORDER: [Self; 2] = [Self::Curl, Self::Wget];

    /// Executable name, if this is an external tool
    pub fn command(self) -> Option<&'static str> {
        match self {
            Self::Curl => Some("curl"),
            Self::Wget => Some("wget"),
            Self::Builtin => None,
        }
    }

    /// Command-line arguments downloading `url` into `dest`
    pub fn args(self, url: &str, dest: &Path) -> Vec<String> {
        let dest = dest.display().to_string();
        match self {
            Self::Curl => vec![
                "-fsSL".to_string(),
                "-o".to_string(),
                dest,
                url.to_string(),
            ],
            Self::Wget => vec!["-q".to_string(), "-O".to_string(), dest, url.to_string()],
            Self::Builtin => Vec::new(),
        }
    }

    /// Pick the first available tool, using `lookup` to find executables
    pub fn probe_with<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<PathBuf>,
    {
        Self::PROBE_ORDER
            .into_iter()
            .find(|tool| tool.command().and_then(&lookup).is_some())
            .unwrap_or(Self::Builtin)
    }

    /// Pick the first tool found on `PATH`
    pub fn probe() -> Self {
        Self::probe_with(|name| which::which(name).ok())
    }
}

impl fmt::Display for TransferTool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Curl => write!(f, "curl"),
            Self::Wget => write!(f, "wget"),
            Self::Builtin => write!(f, "builtin"),
        }
    }
}

impl FromStr for TransferTool {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "curl" => Ok(Self::Curl),
            "wget" => Ok(Self::Wget),
            "builtin" | "http" => Ok(Self::Builtin),
            other => Err(format!(
                "unknown transfer tool '{other}' (expected curl, wget or builtin)"
            )),
        }
    }
}

/// Downloads files with a selected [`TransferTool`]
#[derive(Debug, Clone)]
pub struct Transfer {
    tool: TransferTool,
    /// Resolved executable of an external tool
    program: Option<PathBuf>,
    http: DownloadManager,
}

impl Transfer {
    /// Use `tool`, or probe `PATH` when `None`
    ///
    /// A forced external tool that is not installed is an error.
    pub fn select(tool: Option<TransferTool>, attempts: u32) -> Result<Self, DownloadError> {
        Self::select_with(tool, attempts, |name| which::which(name).ok())
    }

    /// Like [`Transfer::select`], finding executables with `lookup`
    pub fn select_with<F>(
        tool: Option<TransferTool>,
        attempts: u32,
        lookup: F,
    ) -> Result<Self, DownloadError>
    where
        F: Fn(&str) -> Option<PathBuf>,
    {
        let tool = tool.unwrap_or_else(|| TransferTool::probe_with(&lookup));
        let program = match tool.command() {
            Some(command) => Some(lookup(command).ok_or_else(|| {
                DownloadError::ToolUnavailable {
                    tool: command.to_string(),
                }
            })?),
            None => None,
        };
        tracing::debug!("Using transfer tool: {tool}");

        Ok(Self {
            tool,
            program,
            http: DownloadManager::with_config(attempts, 1000),
        })
    }

    /// The selected tool
    pub fn tool(&self) -> TransferTool {
        self.tool
    }

    /// Download `url` into `dest`
    pub async fn fetch(&self, url: &str, dest: &Path) -> Result<(), DownloadError> {
        if let Some(parent) = dest.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| DownloadError::IoError {
                    path: parent.to_path_buf(),
                    error: e.to_string(),
                })?;
        }

        let (Some(command), Some(program)) = (self.tool.command(), &self.program) else {
            let result = self.http.download(url, dest).await?;
            tracing::debug!(
                "Downloaded {} ({} bytes, sha256 {})",
                result.path.display(),
                result.size,
                result.checksum
            );
            return Ok(());
        };

        let status = Command::new(program)
            .args(self.tool.args(url, dest))
            .status()
            .await
            .map_err(|e| DownloadError::ToolFailed {
                tool: command.to_string(),
                url: url.to_string(),
                status: e.to_string(),
            })?;

        if status.success() {
            Ok(())
        } else {
            let _ = tokio::fs::remove_file(dest).await;
            Err(DownloadError::ToolFailed {
                tool: command.to_string(),
                url: url.to_string(),
                status: status.to_string(),
            })
        }
    }
}
