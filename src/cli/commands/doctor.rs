//! CLI command for `xapian-bootstrap doctor`
//!
//! Checks system dependencies and reports issues with suggestions.

use anyhow::Result;

use crate::cli::commands::SettingsArgs;
use crate::cli::output::{
    is_json, is_quiet, print_detail, print_info, print_json, print_success, print_warning, status,
    Reported,
};
use crate::config::defaults::env;
use crate::core::doctor::{doctor_settings, run_doctor};
use crate::core::settings::ConfigFile;
use crate::infra::dirs::BootstrapDirs;

/// Execute the doctor command
pub async fn execute(dirs: &BootstrapDirs, args: &SettingsArgs) -> Result<()> {
    // broken settings become config issues rather than aborting
    let file = ConfigFile::load(dirs).unwrap_or_default();
    let (settings, override_issues) = doctor_settings(&file, args.overrides())?;

    let virtual_env = std::env::var_os(env::VIRTUAL_ENV).map(std::path::PathBuf::from);
    let mut report = run_doctor(virtual_env, &settings, &dirs.config_path());
    for issue in override_issues {
        report.add_config_issue(issue);
    }
    let ready = report.all_required_passed();

    if is_json() {
        print_json(&serde_json::json!({
            "status": if ready { "success" } else { "error" },
            "checks": report.checks,
            "config_issues": report.config_issues,
            "passed_count": report.passed_count(),
            "failed_count": report.failed_count(),
            "total_count": report.checks.len(),
        }))?;
        if !ready {
            return Err(Reported("Missing required dependencies".to_string()).into());
        }
        return Ok(());
    }

    if is_quiet() {
        if !ready {
            for check in report.checks.iter().filter(|c| c.required && !c.passed) {
                eprintln!("{} Missing required: {}", status::ERROR, check.name);
            }
            anyhow::bail!("Missing required dependencies");
        }
        return Ok(());
    }

    print_info("Checking system dependencies...");
    println!();

    for check in &report.checks {
        let version_str = check
            .version
            .as_ref()
            .map(|v| format!(" ({v})"))
            .unwrap_or_default();
        let required_str = if check.required { "" } else { " [optional]" };

        if check.passed {
            println!("  {} {}{version_str}{required_str}", status::SUCCESS, check.name);
        } else {
            println!("  {} {}{required_str}", status::ERROR, check.name);
            if let Some(error) = &check.error {
                print_detail(&format!("Error: {error}"));
            }
            if let Some(suggestion) = &check.suggestion {
                print_detail(&format!("Suggestion: {suggestion}"));
            }
        }
    }

    if !report.config_issues.is_empty() {
        println!();
        print_warning("Configuration issues:");
        for issue in &report.config_issues {
            print_detail(&format!("• {issue}"));
        }
    }

    println!();
    let passed = report.passed_count();
    let total = report.checks.len();

    if ready {
        print_success(&format!("All required checks passed ({passed}/{total})"));
        print_detail("System is ready to build Xapian.");
        Ok(())
    } else {
        println!(
            "{} {passed}/{total} checks passed, {} failed",
            status::ERROR,
            report.failed_count()
        );
        anyhow::bail!("Missing required dependencies. Run 'xapian-bootstrap doctor' for details.")
    }
}
