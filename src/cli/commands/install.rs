//! CLI implementation for `xapian-bootstrap install`
//!
//! Runs every step in order and prints a summary.

use anyhow::Result;

use crate::cli::output::{is_json, print_detail, print_json, print_warning, SpinnerReporter};
use crate::core::environment::EnvironmentRoot;
use crate::core::pipeline::{InstallOptions, Pipeline, VerifyOutcome};
use crate::core::settings::Settings;

/// Execute the install command
pub async fn execute(root: EnvironmentRoot, settings: Settings, skip_haystack: bool) -> Result<()> {
    tracing::info!(
        "Installing Xapian {} into {}",
        settings.version,
        root.path().display()
    );

    let reporter = SpinnerReporter::new();
    let pipeline = Pipeline::new(root, settings, &reporter);
    let summary = pipeline
        .install(InstallOptions { skip_haystack })
        .await?;

    if is_json() {
        return print_json(&serde_json::json!({
            "status": "success",
            "summary": summary,
        }));
    }

    if let Some(haystack) = &summary.haystack {
        print_detail(&format!("haystack: {haystack}"));
    }
    print_detail(&format!("prefix: {}", summary.prefix));
    if let VerifyOutcome::Passed(report) = &summary.verify {
        if !report.matches_requested {
            print_warning(&format!(
                "Imported Xapian {} but {} was requested",
                report.version, summary.version
            ));
        }
        if let Some(extension) = &report.extension {
            print_detail(&format!("extension: {}", extension.display()));
        }
    }

    Ok(())
}
