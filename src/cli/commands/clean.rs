//! CLI implementation for `xapian-bootstrap clean` command
//!
//! Removes archives, extracted sources and build logs.

use anyhow::{Context, Result};

use crate::cli::output::{is_json, print_json, print_success};
use crate::core::clean::{clean_work_dir, has_work_dir};
use crate::core::environment::EnvironmentRoot;

/// Execute the clean command
pub async fn execute(root: EnvironmentRoot) -> Result<()> {
    if !has_work_dir(&root) {
        if is_json() {
            return print_json(&serde_json::json!({ "status": "success", "removed": null }));
        }
        print_success("Nothing to clean");
        return Ok(());
    }

    let result = clean_work_dir(&root).with_context(|| "Failed to clean working directory")?;

    if is_json() {
        return print_json(&serde_json::json!({
            "status": "success",
            "removed": result.removed,
            "freed_bytes": result.freed_bytes,
        }));
    }

    if let Some(removed) = &result.removed {
        print_success(&format!(
            "Removed {} ({})",
            removed.display(),
            format_size(result.freed_bytes)
        ));
    }
    Ok(())
}

/// Human-readable byte count
fn format_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["B", "KiB", "MiB", "GiB"];
    #[allow(clippy::cast_precision_loss)]
    let mut size = bytes as f64;
    let mut unit = 0;
    while size >= 1024.0 && unit < UNITS.len() - 1 {
        size /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{bytes} B")
    } else {
        format!("{size:.1} {}", UNITS[unit])
    }
}
