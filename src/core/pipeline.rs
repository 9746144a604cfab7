//! Install pipeline
//!
//! Guard → Haystack → Fetch → Extract → BuildCore → BuildBindings → Verify.
//! Steps run one after another and the first failure ends the run.

use std::fmt;

use serde::Serialize;

use crate::config::defaults::env;
use crate::core::build_env::BuildEnvironment;
use crate::core::builder::build_package;
use crate::core::environment::EnvironmentRoot;
use crate::core::extract::{extract_archives, ExtractedSource};
use crate::core::fetch::{fetch_archives, FetchedArchive};
use crate::core::haystack::{self, CloneOutcome};
use crate::core::release::{Package, Release};
use crate::core::settings::Settings;
use crate::core::verify::{self, VerifyPolicy, VerifyReport};
use crate::error::{BootstrapError, BuildError};
use crate::infra::transfer::Transfer;

/// Pipeline steps, in execution order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Step {
    Haystack,
    Fetch,
    Extract,
    BuildCore,
    BuildBindings,
    Verify,
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Haystack => "Cloning haystack",
            Self::Fetch => "Downloading archives",
            Self::Extract => "Extracting archives",
            Self::BuildCore => "Building xapian-core",
            Self::BuildBindings => "Building xapian-bindings",
            Self::Verify => "Verifying bindings",
        };
        f.write_str(label)
    }
}

/// Receives progress notifications from the pipeline
pub trait Reporter: Send + Sync {
    /// A step is starting
    fn step_started(&self, step: Step);
    /// A step finished; `detail` is a one-line summary
    fn step_finished(&self, step: Step, detail: &str);
    /// A step failed but the run continues
    fn warn(&self, step: Step, message: &str);
}

/// Reporter that discards everything
#[derive(Debug, Default)]
pub struct SilentReporter;

impl Reporter for SilentReporter {
    fn step_started(&self, _step: Step) {}
    fn step_finished(&self, _step: Step, _detail: &str) {}
    fn warn(&self, _step: Step, _message: &str) {}
}

/// Result of the verify step
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum VerifyOutcome {
    /// The bindings imported
    Passed(VerifyReport),
    /// The import failed under [`VerifyPolicy::Warn`]
    Warned { message: String },
}

/// What a full install did
#[derive(Debug, Clone, Serialize)]
pub struct InstallSummary {
    pub version: String,
    pub prefix: String,
    pub haystack: Option<String>,
    pub haystack_cloned: bool,
    pub transfer: String,
    pub verify: VerifyOutcome,
}

/// Options for [`Pipeline::install`]
#[derive(Debug, Clone, Copy, Default)]
pub struct InstallOptions {
    /// Do not clone haystack
    pub skip_haystack: bool,
}

/// Drives the install steps for one environment
pub struct Pipeline<'a> {
    root: EnvironmentRoot,
    settings: Settings,
    reporter: &'a dyn Reporter,
}

impl<'a> Pipeline<'a> {
    /// Create a pipeline; the guard has already produced `root`
    pub fn new(root: EnvironmentRoot, settings: Settings, reporter: &'a dyn Reporter) -> Self {
        Self {
            root,
            settings,
            reporter,
        }
    }

    /// The environment being installed into
    pub fn root(&self) -> &EnvironmentRoot {
        &self.root
    }

    /// The release described by the settings
    pub fn release(&self) -> Release {
        Release::new(&self.settings.version, &self.settings.base_url)
    }

    /// Run every step
    pub async fn install(&self, options: InstallOptions) -> Result<InstallSummary, BootstrapError> {
        let haystack = if options.skip_haystack {
            None
        } else {
            Some(self.clone_haystack().await?)
        };

        let transfer = self.transfer()?;
        let archives = self.fetch_with(&transfer).await?;
        let sources = self.extract(&archives).await?;
        self.build(&sources).await?;
        let verify = self.verify().await?;

        Ok(InstallSummary {
            version: self.settings.version.clone(),
            prefix: self.root.path().display().to_string(),
            haystack_cloned: matches!(haystack, Some(CloneOutcome::Cloned(_))),
            haystack: haystack.map(|h| h.path().display().to_string()),
            transfer: transfer.tool().to_string(),
            verify,
        })
    }

    /// Clone haystack unless already present
    pub async fn clone_haystack(&self) -> Result<CloneOutcome, BootstrapError> {
        self.reporter.step_started(Step::Haystack);
        let outcome = haystack::ensure_checkout(
            &self.root,
            &self.settings.haystack_repository,
            &self.settings.haystack_branch,
        )
        .await?;

        let detail = match &outcome {
            CloneOutcome::Cloned(result) => format!(
                "Cloned {} at {}",
                result.branch,
                short_sha(&result.commit_sha)
            ),
            CloneOutcome::Skipped { path } => {
                format!("{} already exists, skipped", path.display())
            }
        };
        self.reporter.step_finished(Step::Haystack, &detail);
        Ok(outcome)
    }

    /// Select the transfer tool from the settings
    pub fn transfer(&self) -> Result<Transfer, BootstrapError> {
        Ok(Transfer::select(
            self.settings.transfer,
            self.settings.download_attempts,
        )?)
    }

    /// Download both archives
    pub async fn fetch(&self) -> Result<Vec<FetchedArchive>, BootstrapError> {
        let transfer = self.transfer()?;
        self.fetch_with(&transfer).await
    }

    async fn fetch_with(&self, transfer: &Transfer) -> Result<Vec<FetchedArchive>, BootstrapError> {
        self.reporter.step_started(Step::Fetch);
        let archives = fetch_archives(&self.root, &self.release(), transfer).await?;
        self.reporter.step_finished(
            Step::Fetch,
            &format!("Downloaded {} archives with {}", archives.len(), transfer.tool()),
        );
        Ok(archives)
    }

    /// Unpack downloaded archives
    pub async fn extract(
        &self,
        archives: &[FetchedArchive],
    ) -> Result<Vec<ExtractedSource>, BootstrapError> {
        self.reporter.step_started(Step::Extract);
        let sources = extract_archives(archives).await?;
        self.reporter.step_finished(
            Step::Extract,
            &format!("Extracted into {}", self.root.work_dir().display()),
        );
        Ok(sources)
    }

    /// Source trees from an earlier fetch, located from the settings
    pub fn existing_sources(&self) -> Vec<ExtractedSource> {
        let release = self.release();
        let work_dir = self.root.work_dir();
        Package::ALL
            .iter()
            .map(|package| ExtractedSource {
                package: *package,
                dir: release.archive(*package).source_dir(&work_dir),
            })
            .collect()
    }

    /// Build the core, then the bindings against it
    pub async fn build(&self, sources: &[ExtractedSource]) -> Result<(), BootstrapError> {
        let core = self.source_for(sources, Package::Core)?;
        let bindings = self.source_for(sources, Package::Bindings)?;
        let logs_dir = self.root.logs_dir();

        self.reporter.step_started(Step::BuildCore);
        let core_env = BuildEnvironment::for_core(&self.root, core.dir.clone(), self.settings.jobs)
            .with_make(&self.settings.make);
        build_package(&core_env, &logs_dir).await?;
        self.reporter.step_finished(
            Step::BuildCore,
            &format!("Installed xapian-core into {}", self.root.path().display()),
        );

        self.reporter.step_started(Step::BuildBindings);
        let inherited = std::env::var_os(env::LD_LIBRARY_PATH);
        let bindings_env = BuildEnvironment::for_bindings(
            &self.root,
            bindings.dir.clone(),
            self.settings.jobs,
            &self.settings.bindings_flags,
            inherited.as_deref(),
        )?
        .with_make(&self.settings.make);
        build_package(&bindings_env, &logs_dir).await?;
        self.reporter.step_finished(
            Step::BuildBindings,
            &format!(
                "Installed xapian-bindings ({})",
                self.settings.bindings_flags.join(" ")
            ),
        );

        Ok(())
    }

    fn source_for<'s>(
        &self,
        sources: &'s [ExtractedSource],
        package: Package,
    ) -> Result<&'s ExtractedSource, BootstrapError> {
        sources
            .iter()
            .find(|s| s.package == package)
            .ok_or_else(|| {
                BuildError::MissingSource {
                    package: package.name().to_string(),
                    path: self
                        .release()
                        .archive(package)
                        .source_dir(&self.root.work_dir()),
                }
                .into()
            })
    }

    /// Import the bindings, applying the configured failure policy
    pub async fn verify(&self) -> Result<VerifyOutcome, BootstrapError> {
        self.reporter.step_started(Step::Verify);

        let result = match verify::resolve_interpreter(
            &self.root,
            self.settings.interpreter.as_deref(),
        ) {
            Ok(interpreter) => {
                verify::verify_import(&self.root, &interpreter, &self.settings.version).await
            }
            Err(e) => Err(e),
        };

        match result {
            Ok(report) => {
                self.reporter.step_finished(
                    Step::Verify,
                    &format!("Xapian {} bindings installed successfully", report.version),
                );
                Ok(VerifyOutcome::Passed(report))
            }
            Err(e) if self.settings.verify_policy == VerifyPolicy::Warn => {
                let message = e.to_string();
                tracing::warn!("{message}");
                self.reporter.warn(Step::Verify, &message);
                Ok(VerifyOutcome::Warned { message })
            }
            Err(e) => Err(e.into()),
        }
    }
}

fn short_sha(sha: &str) -> &str {
    sha.get(..12).unwrap_or(sha)
}
