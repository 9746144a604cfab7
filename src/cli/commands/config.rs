//! CLI command for `xapian-bootstrap config`
//!
//! Shows the effective settings and manages the config file.

use anyhow::{Context, Result};

use crate::cli::commands::{load_settings, SettingsArgs};
use crate::cli::output::{is_json, print_detail, print_json, print_success};
use crate::core::settings::ConfigFile;
use crate::infra::dirs::BootstrapDirs;

/// Print the effective settings as TOML, or JSON with `--json`
pub async fn execute_show(dirs: &BootstrapDirs, args: &SettingsArgs) -> Result<()> {
    let settings = load_settings(dirs, args)?;

    if is_json() {
        return print_json(&settings);
    }

    let toml = toml::to_string_pretty(&settings).context("Failed to render settings")?;
    print!("{toml}");
    Ok(())
}

/// Print where the config file is read from
pub async fn execute_path(dirs: &BootstrapDirs) -> Result<()> {
    let path = dirs.config_path();
    if is_json() {
        return print_json(&serde_json::json!({
            "path": path,
            "exists": path.exists(),
        }));
    }
    println!("{}", path.display());
    Ok(())
}

/// Write the effective settings to the config file
pub async fn execute_init(dirs: &BootstrapDirs, args: &SettingsArgs, force: bool) -> Result<()> {
    let path = dirs.config_path();
    if path.exists() && !force {
        anyhow::bail!(
            "{} already exists. Use --force to overwrite.",
            path.display()
        );
    }

    let settings = load_settings(dirs, args)?;
    ConfigFile::from(&settings).save_to_path(&path)?;

    if is_json() {
        return print_json(&serde_json::json!({
            "status": "success",
            "path": path,
        }));
    }
    print_success(&format!("Wrote {}", path.display()));
    print_detail(&format!("Xapian {} from {}", settings.version, settings.base_url));
    Ok(())
}
