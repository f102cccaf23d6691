//! Preflight checks.
//!
//! Validates the builder program, SSH keys and templates before anything is
//! written. Run with `--preflight` to see the report without generating.

mod host_tools;
mod inputs;
mod types;

use crate::error::{KitError, KitResult};
use crate::pipeline::Pipeline;

pub use types::{CheckResult, CheckStatus, PreflightReport};

/// Run all checks relevant to the pipeline's mode.
pub fn run_preflight(pipeline: &Pipeline) -> PreflightReport {
    let mut checks = Vec::new();
    let cfg = &pipeline.config;

    println!("Running preflight checks...\n");

    println!("Checking host tools...");
    checks.push(host_tools::check_packer(&pipeline.invoker));

    println!("Checking SSH keys...");
    checks.extend(inputs::check_keys(
        &cfg.ssh_public_key_path,
        &cfg.ssh_private_key_path,
    ));
    checks.push(inputs::check_staging_dir(&pipeline.workspace.staging_dir));

    println!("Checking templates...");
    for &kind in pipeline.mode.artifacts() {
        checks.push(inputs::check_template(kind, pipeline.template_for(kind)));
    }

    println!();

    PreflightReport { checks }
}

/// Run preflight, print the report, and fail if any check failed.
pub fn run_preflight_or_fail(pipeline: &Pipeline) -> KitResult<()> {
    let report = run_preflight(pipeline);
    report.print();

    if !report.all_passed() {
        let failed: Vec<&str> = report.failures().map(|c| c.name.as_str()).collect();
        return Err(KitError::Precondition(format!(
            "Preflight failed: {} check(s) failed ({}). Fix the issues above before generating.",
            report.fail_count(),
            failed.join(", ")
        )));
    }

    println!("All preflight checks passed!\n");
    Ok(())
}
