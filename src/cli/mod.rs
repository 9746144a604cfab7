//! Command-line interface module
//!
//! This module handles argument parsing and output formatting.
//! It contains no bootstrap logic - that belongs in the [`crate::core`] module.

pub mod commands;
pub mod output;

use std::sync::OnceLock;

use anyhow::Result;
use clap::Parser;

use commands::{Commands, SettingsArgs};

/// Version line with the git revision the binary was built from
fn long_version() -> &'static str {
    static LONG_VERSION: OnceLock<String> = OnceLock::new();
    LONG_VERSION.get_or_init(|| {
        format!(
            "{}\ncommit: {}{}\nbuilt: {}\nrustc: {}",
            env!("CARGO_PKG_VERSION"),
            option_env!("VERGEN_GIT_SHA").unwrap_or("unknown"),
            match option_env!("VERGEN_GIT_DIRTY") {
                Some("true") => " (dirty)",
                _ => "",
            },
            option_env!("VERGEN_BUILD_DATE").unwrap_or("unknown"),
            option_env!("VERGEN_RUSTC_SEMVER").unwrap_or("unknown"),
        )
    })
}

/// xapian-bootstrap - Build Xapian and its Python bindings into a virtualenv
///
/// Without a subcommand, runs the full install: clone haystack, download,
/// build and verify.
#[derive(Parser, Debug)]
#[command(name = "xapian-bootstrap")]
#[command(author, version, long_version = long_version(), about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose output (-v for info, -vv for debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Output in JSON format for scripting
    #[arg(long, global = true)]
    pub json: bool,

    #[command(flatten)]
    pub settings: SettingsArgs,

    /// Do not clone haystack (when running the default install)
    #[arg(long)]
    pub skip_haystack: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

impl Cli {
    /// Execute the CLI command
    pub async fn run(self) -> Result<()> {
        let command = effective_command(self.command, self.skip_haystack);
        command.run(&self.settings).await
    }
}

/// The subcommand to run; `--skip-haystack` before `install` still applies
fn effective_command(command: Option<Commands>, skip_haystack: bool) -> Commands {
    match command {
        None => Commands::Install { skip_haystack },
        Some(Commands::Install {
            skip_haystack: after,
        }) => Commands::Install {
            skip_haystack: skip_haystack || after,
        },
        Some(command) => command,
    }
}
