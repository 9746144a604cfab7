//! CLI implementation for `xapian-bootstrap verify`

use anyhow::Result;

use crate::cli::output::{is_json, print_detail, print_json, print_warning, SpinnerReporter};
use crate::core::environment::EnvironmentRoot;
use crate::core::pipeline::{Pipeline, VerifyOutcome};
use crate::core::settings::Settings;

/// Execute the verify command
pub async fn execute(root: EnvironmentRoot, settings: Settings) -> Result<()> {
    let requested = settings.version.clone();
    let reporter = SpinnerReporter::new();
    let pipeline = Pipeline::new(root, settings, &reporter);

    let outcome = pipeline.verify().await?;

    if is_json() {
        return print_json(&outcome);
    }

    if let VerifyOutcome::Passed(report) = &outcome {
        print_detail(&format!("interpreter: {}", report.interpreter.display()));
        match &report.extension {
            Some(extension) => print_detail(&format!("extension: {}", extension.display())),
            None => print_detail(&format!(
                "extension: not under {}",
                pipeline.root().lib_dir().display()
            )),
        }
        if !report.matches_requested {
            print_warning(&format!(
                "Imported Xapian {} but {requested} was requested",
                report.version
            ));
        }
    }
    Ok(())
}
