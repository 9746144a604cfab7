//! Doctor command logic
//!
//! Checks the tools a source build needs and reports issues with suggestions.

use std::path::Path;

use serde::Serialize;

use crate::core::environment::EnvironmentRoot;
use crate::core::settings::{ConfigFile, Overrides, Settings, SettingsError};
use crate::core::verify;
use crate::infra::transfer::TransferTool;

/// C++ compilers tried in order
const CXX_COMPILERS: [&str; 3] = ["c++", "g++", "clang++"];

/// Result of a single dependency check
#[derive(Debug, Clone, Serialize)]
pub struct CheckResult {
    /// Name of the dependency being checked
    pub name: String,
    /// Whether the check passed
    pub passed: bool,
    /// Version if available
    pub version: Option<String>,
    /// Error message if check failed
    pub error: Option<String>,
    /// Suggestion for fixing the issue
    pub suggestion: Option<String>,
    /// Whether a failure blocks an install
    pub required: bool,
}

impl CheckResult {
    /// Create a passing check result
    pub fn pass(name: &str, version: Option<String>, required: bool) -> Self {
        Self {
            name: name.to_string(),
            passed: true,
            version,
            error: None,
            suggestion: None,
            required,
        }
    }

    /// Create a failing check result
    pub fn fail(name: &str, error: &str, suggestion: Option<&str>, required: bool) -> Self {
        Self {
            name: name.to_string(),
            passed: false,
            version: None,
            error: Some(error.to_string()),
            suggestion: suggestion.map(String::from),
            required,
        }
    }
}

/// Overall doctor report
#[derive(Debug, Default, Serialize)]
pub struct DoctorReport {
    /// Individual check results
    pub checks: Vec<CheckResult>,
    /// Configuration issues found
    pub config_issues: Vec<String>,
}

impl DoctorReport {
    /// Create a new empty report
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_check(&mut self, result: CheckResult) {
        self.checks.push(result);
    }

    pub fn add_config_issue(&mut self, issue: String) {
        self.config_issues.push(issue);
    }

    /// Check if all required checks passed and the config file is sound
    pub fn all_required_passed(&self) -> bool {
        self.config_issues.is_empty()
            && self
                .checks
                .iter()
                .filter(|c| c.required)
                .all(|c| c.passed)
    }

    /// Count passed checks
    pub fn passed_count(&self) -> usize {
        self.checks.iter().filter(|c| c.passed).count()
    }

    /// Count failed checks
    pub fn failed_count(&self) -> usize {
        self.checks.iter().filter(|c| !c.passed).count()
    }
}

/// Run `command --version` and pull a version out of its output
pub fn check_command_available(command: &str) -> Option<String> {
    std::process::Command::new(command)
        .arg("--version")
        .output()
        .ok()
        .and_then(|output| {
            if output.status.success() {
                let stdout = String::from_utf8_lossy(&output.stdout);
                let stderr = String::from_utf8_lossy(&output.stderr);
                extract_version(&format!("{stdout}{stderr}"))
            } else {
                None
            }
        })
}

/// Extract version string from command output
fn extract_version(output: &str) -> Option<String> {
    let version_regex = regex::Regex::new(r"v?(\d+\.\d+(?:\.\d+)?(?:-\w+)?)").ok()?;
    version_regex
        .captures(output)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

/// Check that `VIRTUAL_ENV` points at a usable directory
pub fn check_virtual_env(value: Option<std::path::PathBuf>) -> CheckResult {
    match EnvironmentRoot::from_value(value) {
        Ok(root) => CheckResult::pass(
            "Virtual environment",
            Some(root.path().display().to_string()),
            true,
        ),
        Err(e) => CheckResult::fail(
            "Virtual environment",
            &e.to_string(),
            Some("Run `source <venv>/bin/activate` before bootstrapping"),
            true,
        ),
    }
}

/// Check the download tool that would be used
pub fn check_transfer(forced: Option<TransferTool>) -> CheckResult {
    let tool = forced.unwrap_or_else(TransferTool::probe);
    match tool.command() {
        None => CheckResult::pass(
            "Download tool",
            Some("builtin HTTP client".to_string()),
            true,
        ),
        Some(command) => match which::which(command) {
            Ok(_) => CheckResult::pass(
                "Download tool",
                Some(check_command_available(command).map_or_else(
                    || command.to_string(),
                    |v| format!("{command} {v}"),
                )),
                true,
            ),
            Err(_) => CheckResult::fail(
                "Download tool",
                &format!("{command} not found in PATH"),
                Some("Install curl or wget, or set XAPIAN_TRANSFER=builtin"),
                true,
            ),
        },
    }
}

/// Check the make program
pub fn check_make(make: &str) -> CheckResult {
    if which::which(make).is_err() {
        return CheckResult::fail(
            "Make",
            &format!("{make} not found"),
            Some("Install GNU make with your package manager"),
            true,
        );
    }
    CheckResult::pass("Make", check_command_available(make), true)
}

/// Check for a C++ compiler
pub fn check_cxx() -> CheckResult {
    for compiler in CXX_COMPILERS {
        if which::which(compiler).is_ok() {
            return CheckResult::pass(
                &format!("C++ compiler ({compiler})"),
                check_command_available(compiler),
                true,
            );
        }
    }
    CheckResult::fail(
        "C++ compiler",
        "No C++ compiler found in PATH",
        Some("Install g++ or clang++ (build-essential on Debian/Ubuntu)"),
        true,
    )
}

/// Check for the interpreter used by the import check
pub fn check_python(root: Option<&EnvironmentRoot>, configured: Option<&Path>) -> CheckResult {
    let resolved = match root {
        Some(root) => verify::resolve_interpreter(root, configured).ok(),
        None => configured
            .map(which::which)
            .unwrap_or_else(|| which::which("python3"))
            .ok(),
    };

    match resolved {
        Some(python) => {
            let shown = python.display().to_string();
            let version = check_command_available(&shown)
                .map_or_else(|| shown.clone(), |v| format!("{v} ({shown})"));
            CheckResult::pass("Python", Some(version), true)
        }
        None => CheckResult::fail(
            "Python",
            "No Python interpreter found",
            Some("Create the virtual environment with `python -m venv`"),
            true,
        ),
    }
}

/// Check that the config file parses
pub fn check_config_file(path: &Path) -> Vec<String> {
    if !path.exists() {
        return Vec::new();
    }
    match ConfigFile::load_from_path(path) {
        Ok(file) => match Settings::resolve(&file, &Overrides::default()) {
            Ok(_) => Vec::new(),
            Err(e) => vec![format!("{}: {e}", path.display())],
        },
        Err(e) => vec![e.to_string()],
    }
}

/// Settings to run the checks with, and problems found in the overrides
///
/// Unusable overrides are dropped and reported. A config file that does not
/// resolve falls back to the defaults; [`check_config_file`] reports it.
pub fn doctor_settings(
    file: &ConfigFile,
    overrides: Result<Overrides, SettingsError>,
) -> Result<(Settings, Vec<String>), SettingsError> {
    let mut issues = Vec::new();

    let overrides = overrides
        .and_then(|overrides| {
            Settings::resolve(&ConfigFile::default(), &overrides).map(|_| overrides)
        })
        .unwrap_or_else(|e| {
            issues.push(format!("Override: {e}"));
            Overrides::default()
        });

    let settings = match Settings::resolve(file, &overrides) {
        Ok(settings) => settings,
        Err(_) => Settings::resolve(&ConfigFile::default(), &overrides)?,
    };
    Ok((settings, issues))
}

/// Run all doctor checks
pub fn run_doctor(
    virtual_env: Option<std::path::PathBuf>,
    settings: &Settings,
    config_path: &Path,
) -> DoctorReport {
    let mut report = DoctorReport::new();

    let root = EnvironmentRoot::from_value(virtual_env.clone()).ok();
    report.add_check(check_virtual_env(virtual_env));
    report.add_check(check_transfer(settings.transfer));
    report.add_check(check_make(&settings.make));
    report.add_check(check_cxx());
    report.add_check(check_python(root.as_ref(), settings.interpreter.as_deref()));

    for issue in check_config_file(config_path) {
        report.add_config_issue(issue);
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_extract_version() {
        assert_eq!(
            extract_version("curl 7.68.0 (x86_64-pc-linux-gnu)"),
            Some("7.68.0".to_string())
        );
        assert_eq!(
            extract_version("GNU Make 4.3"),
            Some("4.3".to_string())
        );
        assert_eq!(extract_version("no digits here"), None);
    }

    #[test]
    fn test_virtual_env_missing() {
        let result = check_virtual_env(None);
        assert!(!result.passed);
        assert!(result.required);
        assert!(result.error.unwrap().contains("VIRTUAL_ENV"));
    }

    #[test]
    fn test_virtual_env_present() {
        let temp = TempDir::new().unwrap();
        let result = check_virtual_env(Some(temp.path().to_path_buf()));
        assert!(result.passed);
    }

    #[test]
    fn test_builtin_transfer_always_passes() {
        let result = check_transfer(Some(TransferTool::Builtin));
        assert!(result.passed);
        assert_eq!(result.version.as_deref(), Some("builtin HTTP client"));
    }

    #[test]
    fn test_missing_make_fails() {
        let result = check_make("/nonexistent/bin/make");
        assert!(!result.passed);
        assert!(result.suggestion.is_some());
    }

    #[test]
    fn test_config_file_absent_is_fine() {
        let temp = TempDir::new().unwrap();
        assert!(check_config_file(&temp.path().join("config.toml")).is_empty());
    }

    #[test]
    fn test_config_file_invalid_version() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.toml");
        std::fs::write(&path, "[release]\nversion = \"one.two\"\n").unwrap();

        let issues = check_config_file(&path);
        assert_eq!(issues.len(), 1);
    }

    #[test]
    fn test_config_file_unparseable() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.toml");
        std::fs::write(&path, "[release\n").unwrap();

        assert_eq!(check_config_file(&path).len(), 1);
    }

    #[test]
    fn test_invalid_version_override_is_an_issue() {
        let overrides = Overrides {
            version: Some("latest".to_string()),
            ..Overrides::default()
        };
        let (settings, issues) =
            doctor_settings(&ConfigFile::default(), Ok(overrides)).unwrap();

        assert_eq!(settings.version, crate::config::defaults::XAPIAN_VERSION);
        assert_eq!(issues.len(), 1);
        assert!(issues[0].contains("latest"));
    }

    #[test]
    fn test_unparseable_override_is_an_issue() {
        let err = SettingsError::InvalidValue {
            name: "--jobs".to_string(),
            value: "abc".to_string(),
            error: "invalid digit found in string".to_string(),
        };
        let (_, issues) = doctor_settings(&ConfigFile::default(), Err(err)).unwrap();
        assert!(issues[0].contains("'abc'"));
    }

    #[test]
    fn test_broken_file_falls_back_without_override_issue() {
        let mut file = ConfigFile::default();
        file.build.jobs = Some(0);
        let overrides = Overrides {
            version: Some("1.2.5".to_string()),
            ..Overrides::default()
        };

        let (settings, issues) = doctor_settings(&file, Ok(overrides)).unwrap();
        assert_eq!(settings.version, "1.2.5");
        assert!(issues.is_empty());
    }

    #[test]
    fn test_report_counts() {
        let mut report = DoctorReport::new();
        report.add_check(CheckResult::pass("a", None, true));
        report.add_check(CheckResult::fail("b", "missing", None, false));

        assert_eq!(report.passed_count(), 1);
        assert_eq!(report.failed_count(), 1);
        assert!(report.all_required_passed());

        report.add_config_issue("bad".to_string());
        assert!(!report.all_required_passed());
    }
}
