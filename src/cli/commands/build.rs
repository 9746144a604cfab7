//! CLI implementation for `xapian-bootstrap build` command
//!
//! Builds sources left in `<root>/packages` by an earlier `fetch`.

use anyhow::Result;

use crate::cli::output::{is_json, print_json, SpinnerReporter};
use crate::core::environment::EnvironmentRoot;
use crate::core::pipeline::Pipeline;
use crate::core::settings::Settings;

/// Execute the build command
pub async fn execute(root: EnvironmentRoot, settings: Settings) -> Result<()> {
    let reporter = SpinnerReporter::new();
    let pipeline = Pipeline::new(root, settings, &reporter);

    let sources = pipeline.existing_sources();
    if let Some(missing) = sources.iter().find(|s| !s.dir.is_dir()) {
        anyhow::bail!(
            "{} not found. Run 'xapian-bootstrap fetch' first.",
            missing.dir.display()
        );
    }

    pipeline.build(&sources).await?;

    if is_json() {
        return print_json(&serde_json::json!({
            "status": "success",
            "prefix": pipeline.root().path(),
            "logs": pipeline.root().logs_dir(),
        }));
    }
    Ok(())
}
