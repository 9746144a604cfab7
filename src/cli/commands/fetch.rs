//! CLI implementation for `xapian-bootstrap fetch` command
//!
//! Downloads both release archives and, unless told otherwise, unpacks them.

use anyhow::Result;

use crate::cli::output::{is_json, print_detail, print_json, SpinnerReporter};
use crate::core::environment::EnvironmentRoot;
use crate::core::pipeline::Pipeline;
use crate::core::settings::Settings;

/// Execute the fetch command
pub async fn execute(root: EnvironmentRoot, settings: Settings, extract: bool) -> Result<()> {
    let reporter = SpinnerReporter::new();
    let pipeline = Pipeline::new(root, settings, &reporter);

    let archives = pipeline.fetch().await?;
    let sources = if extract {
        pipeline.extract(&archives).await?
    } else {
        Vec::new()
    };

    if is_json() {
        return print_json(&serde_json::json!({
            "status": "success",
            "archives": archives.iter().map(|a| serde_json::json!({
                "package": a.spec.package,
                "url": a.spec.url,
                "path": a.path,
            })).collect::<Vec<_>>(),
            "sources": sources.iter().map(|s| &s.dir).collect::<Vec<_>>(),
        }));
    }

    for archive in &archives {
        print_detail(&format!("{} <- {}", archive.path.display(), archive.spec.url));
    }
    Ok(())
}
