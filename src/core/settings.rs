//! Settings resolution
//!
//! Effective settings are layered: command-line flags and their environment
//! variables win over `config.toml`, which wins over built-in defaults.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::{defaults, urls};
use crate::core::verify::VerifyPolicy;
use crate::infra::dirs::BootstrapDirs;
use crate::infra::transfer::TransferTool;

/// Settings error types
#[derive(Error, Debug)]
pub enum SettingsError {
    /// Failed to read or write the config file
    #[error("Failed to access config file '{path}': {error}")]
    Io { path: String, error: String },

    /// Failed to parse or serialize the config file
    #[error("Failed to parse config file '{path}': {error}")]
    Parse { path: String, error: String },

    /// Release version is not a dotted version number
    #[error("Invalid Xapian version '{version}': {error}")]
    InvalidVersion { version: String, error: String },

    /// Jobs must be positive
    #[error("Build jobs must be greater than 0")]
    InvalidJobs,

    /// A flag or environment value could not be parsed
    #[error("Invalid value '{value}' for {name}: {error}")]
    InvalidValue {
        name: String,
        value: String,
        error: String,
    },
}

/// Contents of `config.toml`
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ConfigFile {
    /// Which release to install
    #[serde(default)]
    pub release: ReleaseSection,

    /// How archives are downloaded
    #[serde(default)]
    pub fetch: FetchSection,

    /// How packages are built
    #[serde(default)]
    pub build: BuildSection,

    /// Post-install smoke check
    #[serde(default)]
    pub verify: VerifySection,

    /// Framework checkout
    #[serde(default)]
    pub haystack: HaystackSection,
}

/// `[release]`
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ReleaseSection {
    pub version: Option<String>,
    pub base_url: Option<String>,
}

/// `[fetch]`
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct FetchSection {
    pub transfer: Option<TransferTool>,
    pub download_retries: Option<u32>,
}

/// `[build]`
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct BuildSection {
    pub jobs: Option<usize>,
    pub make: Option<String>,
    /// Configure flags for the bindings package (default `--with-python`)
    pub bindings_flags: Option<Vec<String>>,
}

/// `[verify]`
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct VerifySection {
    pub policy: Option<VerifyPolicy>,
    pub interpreter: Option<PathBuf>,
}

/// `[haystack]`
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct HaystackSection {
    pub repository: Option<String>,
    pub branch: Option<String>,
}

impl ConfigFile {
    /// Load from the platform config directory
    pub fn load(dirs: &BootstrapDirs) -> Result<Self, SettingsError> {
        Self::load_from_path(&dirs.config_path())
    }

    /// Load from `path`; a missing file yields the defaults
    pub fn load_from_path(path: &Path) -> Result<Self, SettingsError> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path).map_err(|e| SettingsError::Io {
            path: path.display().to_string(),
            error: e.to_string(),
        })?;

        toml::from_str(&content).map_err(|e| SettingsError::Parse {
            path: path.display().to_string(),
            error: e.to_string(),
        })
    }

    /// Save to `path`, creating parent directories
    pub fn save_to_path(&self, path: &Path) -> Result<(), SettingsError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| SettingsError::Io {
                path: parent.display().to_string(),
                error: e.to_string(),
            })?;
        }

        let content = toml::to_string_pretty(self).map_err(|e| SettingsError::Parse {
            path: path.display().to_string(),
            error: e.to_string(),
        })?;

        fs::write(path, content).map_err(|e| SettingsError::Io {
            path: path.display().to_string(),
            error: e.to_string(),
        })
    }
}

/// Values supplied on the command line or through environment variables
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Overrides {
    pub version: Option<String>,
    pub base_url: Option<String>,
    pub transfer: Option<TransferTool>,
    pub jobs: Option<usize>,
    pub make: Option<String>,
    pub verify_policy: Option<VerifyPolicy>,
    pub interpreter: Option<PathBuf>,
    pub haystack_repository: Option<String>,
    pub haystack_branch: Option<String>,
}

/// Fully resolved settings
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Settings {
    pub version: String,
    pub base_url: String,
    /// `None` means probe for curl, then wget, then the built-in client
    pub transfer: Option<TransferTool>,
    pub download_attempts: u32,
    pub jobs: usize,
    pub make: String,
    pub bindings_flags: Vec<String>,
    pub verify_policy: VerifyPolicy,
    pub interpreter: Option<PathBuf>,
    pub haystack_repository: String,
    pub haystack_branch: String,
}

impl Settings {
    /// Layer `overrides` over `file` over defaults
    pub fn resolve(file: &ConfigFile, overrides: &Overrides) -> Result<Self, SettingsError> {
        let version = pick(&overrides.version, &file.release.version)
            .unwrap_or_else(|| defaults::XAPIAN_VERSION.to_string());
        validate_version(&version)?;

        let base_url = pick(&overrides.base_url, &file.release.base_url)
            .unwrap_or_else(|| urls::XAPIAN_DOWNLOAD.to_string())
            .trim_end_matches('/')
            .to_string();

        let jobs = overrides
            .jobs
            .or(file.build.jobs)
            .unwrap_or_else(num_cpus::get);
        if jobs == 0 {
            return Err(SettingsError::InvalidJobs);
        }

        Ok(Self {
            version,
            base_url,
            transfer: overrides.transfer.or(file.fetch.transfer),
            download_attempts: file
                .fetch
                .download_retries
                .map_or(defaults::DOWNLOAD_ATTEMPTS, |retries| {
                    retries.saturating_add(1)
                }),
            jobs,
            make: pick(&overrides.make, &file.build.make)
                .unwrap_or_else(|| defaults::MAKE.to_string()),
            bindings_flags: file
                .build
                .bindings_flags
                .clone()
                .unwrap_or_else(|| vec![defaults::BINDINGS_FLAG.to_string()]),
            verify_policy: overrides
                .verify_policy
                .or(file.verify.policy)
                .unwrap_or_default(),
            interpreter: overrides
                .interpreter
                .clone()
                .or_else(|| file.verify.interpreter.clone()),
            haystack_repository: pick(
                &overrides.haystack_repository,
                &file.haystack.repository,
            )
            .unwrap_or_else(|| urls::HAYSTACK_REPOSITORY.to_string()),
            haystack_branch: pick(&overrides.haystack_branch, &file.haystack.branch)
                .unwrap_or_else(|| defaults::HAYSTACK_BRANCH.to_string()),
        })
    }
}

impl From<&Settings> for ConfigFile {
    fn from(settings: &Settings) -> Self {
        Self {
            release: ReleaseSection {
                version: Some(settings.version.clone()),
                base_url: Some(settings.base_url.clone()),
            },
            fetch: FetchSection {
                transfer: settings.transfer,
                download_retries: Some(settings.download_attempts.saturating_sub(1)),
            },
            build: BuildSection {
                jobs: Some(settings.jobs),
                make: Some(settings.make.clone()),
                bindings_flags: Some(settings.bindings_flags.clone()),
            },
            verify: VerifySection {
                policy: Some(settings.verify_policy),
                interpreter: settings.interpreter.clone(),
            },
            haystack: HaystackSection {
                repository: Some(settings.haystack_repository.clone()),
                branch: Some(settings.haystack_branch.clone()),
            },
        }
    }
}

/// First non-empty value of `over` and `file`
fn pick(over: &Option<String>, file: &Option<String>) -> Option<String> {
    over.iter()
        .chain(file.iter())
        .map(|s| s.trim())
        .find(|s| !s.is_empty())
        .map(ToString::to_string)
}

/// Xapian releases are numbered `major.minor.patch`
fn validate_version(version: &str) -> Result<(), SettingsError> {
    semver::Version::parse(version)
        .map(|_| ())
        .map_err(|e| SettingsError::InvalidVersion {
            version: version.to_string(),
            error: e.to_string(),
        })
}
