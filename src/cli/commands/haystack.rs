//! CLI implementation for `xapian-bootstrap haystack`

use anyhow::Result;

use crate::cli::output::{is_json, print_json, SpinnerReporter};
use crate::core::environment::EnvironmentRoot;
use crate::core::haystack::CloneOutcome;
use crate::core::pipeline::Pipeline;
use crate::core::settings::Settings;

/// Execute the haystack command
pub async fn execute(root: EnvironmentRoot, settings: Settings) -> Result<()> {
    let reporter = SpinnerReporter::new();
    let pipeline = Pipeline::new(root, settings, &reporter);
    let outcome = pipeline.clone_haystack().await?;

    if is_json() {
        let json = match &outcome {
            CloneOutcome::Cloned(result) => serde_json::json!({
                "status": "cloned",
                "path": result.path,
                "branch": result.branch,
                "commit": result.commit_sha,
            }),
            CloneOutcome::Skipped { path } => serde_json::json!({
                "status": "skipped",
                "path": path,
            }),
        };
        return print_json(&json);
    }

    Ok(())
}
