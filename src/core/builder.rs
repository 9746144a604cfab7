//! Build orchestration logic
//!
//! Runs configure, make and make install for one package. The first stage
//! that fails stops the package; nothing already installed is rolled back.

use std::path::Path;

use crate::core::build_env::{BuildEnvironment, BuildStage};
use crate::error::BuildError;

/// Build and install one package
///
/// Each stage's output goes to its own log in `logs_dir`.
pub async fn build_package(env: &BuildEnvironment, logs_dir: &Path) -> Result<(), BuildError> {
    let package = env.package.name();

    if !env.srcdir.is_dir() {
        return Err(BuildError::MissingSource {
            package: package.to_string(),
            path: env.srcdir.clone(),
        });
    }

    for stage in BuildStage::ALL {
        let command = env.command(stage);
        let log = env.log_path(logs_dir, stage);
        tracing::info!("{package}: {}", command.display());

        let status = command
            .run_logged(&log)
            .await
            .map_err(|e| BuildError::Spawn {
                package: package.to_string(),
                stage: stage.label().to_string(),
                error: e.to_string(),
            })?;

        if !status.success() {
            tracing::error!("{package}: {stage} failed with {status}");
            return Err(BuildError::StageFailed {
                package: package.to_string(),
                stage: stage.label().to_string(),
                status: status.to_string(),
                log,
            });
        }
    }

    tracing::info!("{package}: installed into {}", env.prefix.display());
    Ok(())
}
