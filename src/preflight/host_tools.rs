//! Builder program availability.

use crate::build::PackerInvoker;
use crate::process::Cmd;

use super::types::CheckResult;

/// Check the builder program is on PATH. Every mode requires it.
pub fn check_packer(invoker: &PackerInvoker) -> CheckResult {
    let name = invoker.program();
    match invoker.ensure_installed() {
        Ok(path) => {
            let version = Cmd::new(name)
                .arg("version")
                .dir(invoker.work_dir())
                .allow_fail()
                .run()
                .ok()
                .filter(|r| r.success())
                .map(|r| r.stdout_trimmed().lines().next().unwrap_or_default().to_string());
            let details = match version {
                Some(v) if !v.is_empty() => format!("{} ({})", path.display(), v),
                _ => path.display().to_string(),
            };
            CheckResult::pass_with(name, &details)
        }
        Err(err) => CheckResult::fail(name, &err.to_string()),
    }
}
