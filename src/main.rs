//! xapian-bootstrap CLI
//!
//! Entry point for the xapian-bootstrap command-line application.

use anyhow::Result;
use clap::Parser;

use xapian_bootstrap::cli::output::{display_error, OutputConfig};
use xapian_bootstrap::cli::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let output_config = OutputConfig::new(cli.quiet, cli.json, cli.verbose);
    output_config.apply_global();

    // RUST_LOG directives take precedence over -v
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::builder()
                .with_default_directive(
                    tracing::level_filters::LevelFilter::from_level(output_config.log_level())
                        .into(),
                )
                .from_env_lossy(),
        )
        .with_writer(std::io::stderr)
        .init();

    match cli.run().await {
        Ok(()) => Ok(()),
        Err(e) => {
            display_error(&e);
            std::process::exit(1);
        }
    }
}
