//! Output formatting and progress indicators
//!
//! This module provides utilities for displaying spinners, status lines and
//! errors. Output mode (quiet, JSON, verbose) is set once from the global
//! flags and read by every command.

use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};
use std::sync::Mutex;

use indicatif::{ProgressBar, ProgressStyle};

use crate::config::defaults::FAILURE_LOG_TAIL;
use crate::core::pipeline::{Reporter, Step};
use crate::error::{BootstrapError, BuildError};
use crate::infra::filesystem;

static QUIET: AtomicBool = AtomicBool::new(false);
static JSON: AtomicBool = AtomicBool::new(false);
static VERBOSITY: AtomicU8 = AtomicU8::new(0);

/// Output settings derived from the global flags
#[derive(Debug, Clone, Copy, Default)]
pub struct OutputConfig {
    pub quiet: bool,
    pub json: bool,
    pub verbose: u8,
}

impl OutputConfig {
    pub fn new(quiet: bool, json: bool, verbose: u8) -> Self {
        Self {
            quiet,
            json,
            verbose,
        }
    }

    /// Make this configuration visible to [`is_quiet`], [`is_json`] and
    /// [`verbosity`]
    pub fn apply_global(self) {
        QUIET.store(self.quiet, Ordering::Relaxed);
        JSON.store(self.json, Ordering::Relaxed);
        VERBOSITY.store(self.verbose, Ordering::Relaxed);
    }

    /// Tracing filter directive for the verbosity level
    pub fn log_level(self) -> tracing::Level {
        match self.verbose {
            0 => tracing::Level::WARN,
            1 => tracing::Level::INFO,
            _ => tracing::Level::DEBUG,
        }
    }
}

pub fn is_quiet() -> bool {
    QUIET.load(Ordering::Relaxed)
}

pub fn is_json() -> bool {
    JSON.load(Ordering::Relaxed)
}

pub fn verbosity() -> u8 {
    VERBOSITY.load(Ordering::Relaxed)
}

/// Human-readable output is suppressed in quiet and JSON modes
fn is_silent() -> bool {
    is_quiet() || is_json()
}

pub fn print_success(message: &str) {
    if !is_silent() {
        println!("{} {message}", status::SUCCESS);
    }
}

pub fn print_info(message: &str) {
    if !is_silent() {
        println!("{} {message}", status::INFO);
    }
}

/// Warnings go to stderr and survive `--quiet`
pub fn print_warning(message: &str) {
    if !is_json() {
        eprintln!("{} {message}", status::WARNING);
    }
}

/// Indented continuation line
pub fn print_detail(message: &str) {
    if !is_silent() {
        println!("    {message}");
    }
}

/// Print `value` as pretty JSON on stdout
pub fn print_json<T: serde::Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// A failure whose details were already printed by the command
#[derive(Debug, thiserror::Error)]
#[error("{0}")]
pub struct Reported(pub String);

/// Print an error with its cause chain
///
/// Build failures also show the tail of the failing stage's log.
pub fn display_error(error: &anyhow::Error) {
    if is_json() {
        if error.downcast_ref::<Reported>().is_some() {
            return;
        }
        let json = serde_json::json!({
            "status": "error",
            "error": error.to_string(),
            "causes": error.chain().skip(1).map(ToString::to_string).collect::<Vec<_>>(),
        });
        println!("{}", serde_json::to_string_pretty(&json).unwrap_or_default());
        return;
    }

    eprintln!("{} {error}", status::ERROR);
    if verbosity() > 0 {
        for cause in error.chain().skip(1) {
            eprintln!("  caused by: {cause}");
        }
    }

    if let Some(log) = failed_stage_log(error) {
        let tail = filesystem::tail(log, FAILURE_LOG_TAIL);
        if !tail.is_empty() {
            eprintln!();
            eprintln!("Last lines of {}:", log.display());
            for line in tail.lines() {
                eprintln!("  {line}");
            }
        }
    }
}

fn failed_stage_log(error: &anyhow::Error) -> Option<&std::path::Path> {
    let build = error.chain().find_map(|cause| {
        cause.downcast_ref::<BuildError>().or_else(|| {
            match cause.downcast_ref::<BootstrapError>() {
                Some(BootstrapError::Build(e)) => Some(e),
                _ => None,
            }
        })
    })?;
    match build {
        BuildError::StageFailed { log, .. } => Some(log.as_path()),
        _ => None,
    }
}

/// Create a spinner for operations with unknown duration
///
/// Hidden in quiet and JSON modes.
pub fn create_spinner(message: &str) -> ProgressBar {
    if is_silent() {
        return ProgressBar::hidden();
    }
    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner()
        .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏")
        .template("{spinner:.blue} {msg}")
    {
        pb.set_style(style);
    }
    pb.set_message(message.to_string());
    pb.enable_steady_tick(std::time::Duration::from_millis(80));
    pb
}

/// Shows one spinner per pipeline step
#[derive(Debug, Default)]
pub struct SpinnerReporter {
    current: Mutex<Option<ProgressBar>>,
}

impl SpinnerReporter {
    pub fn new() -> Self {
        Self::default()
    }

    fn take(&self) -> Option<ProgressBar> {
        self.current.lock().ok().and_then(|mut c| c.take())
    }
}

impl Reporter for SpinnerReporter {
    fn step_started(&self, step: Step) {
        let spinner = create_spinner(&format!("{step}..."));
        if let Ok(mut current) = self.current.lock() {
            if let Some(previous) = current.replace(spinner) {
                previous.finish_and_clear();
            }
        }
    }

    fn step_finished(&self, _step: Step, detail: &str) {
        if let Some(spinner) = self.take() {
            spinner.finish_and_clear();
        }
        print_success(detail);
    }

    fn warn(&self, _step: Step, message: &str) {
        if let Some(spinner) = self.take() {
            spinner.finish_and_clear();
        }
        print_warning(message);
    }
}

impl Drop for SpinnerReporter {
    fn drop(&mut self) {
        if let Some(spinner) = self.take() {
            spinner.finish_and_clear();
        }
    }
}

/// Status message prefixes
pub mod status {
    /// Success prefix (green checkmark)
    pub const SUCCESS: &str = "✓";

    /// Error prefix (red X)
    pub const ERROR: &str = "✗";

    /// Warning prefix (yellow triangle)
    pub const WARNING: &str = "⚠";

    /// Info prefix (blue circle)
    pub const INFO: &str = "ℹ";
}
