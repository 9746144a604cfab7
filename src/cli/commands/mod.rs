//! CLI command implementations
//!
//! Each command is implemented in its own submodule.

pub mod build;
pub mod clean;
pub mod config;
pub mod doctor;
pub mod fetch;
pub mod haystack;
pub mod install;
pub mod verify;

use std::fmt::Display;
use std::path::PathBuf;
use std::str::FromStr;

use anyhow::Result;
use clap::{Args, Subcommand};

use crate::config::defaults::env;
use crate::core::environment::EnvironmentRoot;
use crate::core::settings::{ConfigFile, Overrides, Settings, SettingsError};
use crate::core::verify::VerifyPolicy;
use crate::infra::dirs::BootstrapDirs;
use crate::infra::transfer::TransferTool;

/// Options shared by every command; each also reads its environment variable
///
/// Typed values are kept as text here and parsed by [`SettingsArgs::overrides`],
/// after the virtualenv guard has run.
#[derive(Args, Debug, Clone, Default)]
pub struct SettingsArgs {
    /// Xapian release to install
    #[arg(long, global = true, env = env::XAPIAN_VERSION, value_name = "VERSION")]
    pub xapian_version: Option<String>,

    /// Base URL the release archives are downloaded from
    #[arg(long, global = true, env = env::XAPIAN_BASE_URL, value_name = "URL")]
    pub base_url: Option<String>,

    /// Download with curl, wget or the builtin client instead of probing
    #[arg(long, global = true, env = env::XAPIAN_TRANSFER, value_name = "TOOL")]
    pub transfer: Option<String>,

    /// Number of parallel make jobs
    #[arg(short, long, global = true, env = env::XAPIAN_JOBS, value_name = "JOBS")]
    pub jobs: Option<String>,

    /// Make program
    #[arg(long, global = true, env = env::XAPIAN_MAKE, value_name = "PROGRAM")]
    pub make: Option<String>,

    /// Python interpreter used to check the bindings
    #[arg(long, global = true, value_name = "PATH")]
    pub interpreter: Option<PathBuf>,

    /// Report a failed import as a warning instead of an error
    #[arg(long, global = true)]
    pub warn_only: bool,

    /// Haystack git repository
    #[arg(long, global = true, env = env::HAYSTACK_REPO, value_name = "URL")]
    pub haystack_repo: Option<String>,

    /// Haystack branch to check out
    #[arg(long, global = true, value_name = "BRANCH")]
    pub haystack_branch: Option<String>,
}

impl SettingsArgs {
    /// Values given on the command line or through the environment
    pub fn overrides(&self) -> Result<Overrides, SettingsError> {
        Ok(Overrides {
            version: self.xapian_version.clone(),
            base_url: self.base_url.clone(),
            transfer: parse_value::<TransferTool>("--transfer", self.transfer.as_deref())?,
            jobs: parse_value::<usize>("--jobs", self.jobs.as_deref())?,
            make: self.make.clone(),
            verify_policy: self.warn_only.then_some(VerifyPolicy::Warn),
            interpreter: self.interpreter.clone(),
            haystack_repository: self.haystack_repo.clone(),
            haystack_branch: self.haystack_branch.clone(),
        })
    }
}

fn parse_value<T>(name: &str, value: Option<&str>) -> Result<Option<T>, SettingsError>
where
    T: FromStr,
    T::Err: Display,
{
    value
        .map(|value| {
            value
                .trim()
                .parse()
                .map_err(|e: T::Err| SettingsError::InvalidValue {
                    name: name.to_string(),
                    value: value.to_string(),
                    error: e.to_string(),
                })
        })
        .transpose()
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Clone haystack, download, build and verify (default)
    Install {
        /// Do not clone haystack
        #[arg(long)]
        skip_haystack: bool,
    },

    /// Clone haystack into <VIRTUAL_ENV>/src/haystack
    Haystack,

    /// Download and extract the release archives
    Fetch {
        /// Only download, do not extract
        #[arg(long)]
        no_extract: bool,
    },

    /// Build and install previously fetched sources
    Build,

    /// Check that the bindings import
    Verify,

    /// Check system dependencies
    Doctor,

    /// Remove downloaded archives, sources and build logs
    Clean,

    /// Inspect the configuration file
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

/// Config subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Print the effective settings
    Show,

    /// Print the config file location
    Path,

    /// Write a config file with the current effective settings
    Init {
        /// Overwrite an existing file
        #[arg(short, long)]
        force: bool,
    },
}

impl Commands {
    /// Execute the command
    pub async fn run(self, args: &SettingsArgs) -> Result<()> {
        let dirs = BootstrapDirs::new();
        match self {
            Self::Install { skip_haystack } => {
                install::execute(guard()?, load_settings(&dirs, args)?, skip_haystack).await
            }
            Self::Haystack => haystack::execute(guard()?, load_settings(&dirs, args)?).await,
            Self::Fetch { no_extract } => {
                fetch::execute(guard()?, load_settings(&dirs, args)?, !no_extract).await
            }
            Self::Build => build::execute(guard()?, load_settings(&dirs, args)?).await,
            Self::Verify => verify::execute(guard()?, load_settings(&dirs, args)?).await,
            Self::Doctor => doctor::execute(&dirs, args).await,
            Self::Clean => clean::execute(guard()?).await,
            Self::Config { command } => match command {
                ConfigCommands::Show => config::execute_show(&dirs, args).await,
                ConfigCommands::Path => config::execute_path(&dirs).await,
                ConfigCommands::Init { force } => config::execute_init(&dirs, args, force).await,
            },
        }
    }
}

/// Refuse to run outside an activated virtual environment
fn guard() -> Result<EnvironmentRoot> {
    Ok(EnvironmentRoot::from_env()?)
}

/// Resolve settings from flags, environment and the config file
pub(crate) fn load_settings(dirs: &BootstrapDirs, args: &SettingsArgs) -> Result<Settings> {
    let overrides = args.overrides()?;
    let file = ConfigFile::load(dirs)?;
    Ok(Settings::resolve(&file, &overrides)?)
}
