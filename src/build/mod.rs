//! Packer invocation.
//!
//! Two sequential calls against the rendered template: `packer init` to
//! install the plugins the template declares, then `packer build`. Both
//! inherit stdio so Packer's own output streams through unmodified. A
//! failing `init` skips `build`. There are no retries.

use std::path::{Path, PathBuf};

use crate::error::{KitError, KitResult};
use crate::process::{self, Cmd};

/// Default builder program name.
pub const DEFAULT_PROGRAM: &str = "packer";

/// Sub-commands, in the order they run.
pub const STEPS: [&str; 2] = ["init", "build"];

/// Runs the external builder against a rendered template.
#[derive(Debug, Clone)]
pub struct PackerInvoker {
    program: String,
    work_dir: PathBuf,
}

impl PackerInvoker {
    /// Invoker for `program`, run from `work_dir`.
    pub fn new(program: impl Into<String>, work_dir: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            work_dir: work_dir.into(),
        }
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn work_dir(&self) -> &Path {
        &self.work_dir
    }

    /// Fail unless the builder program can be found.
    pub fn ensure_installed(&self) -> KitResult<PathBuf> {
        process::which(&self.program).ok_or_else(|| {
            KitError::Precondition(format!(
                "{} is not installed or not in the system PATH. Please install Packer and try again.",
                self.program
            ))
        })
    }

    /// Run `init` then `build` against `artifact`.
    ///
    /// `artifact` is passed relative to the working directory when it lives
    /// inside it, matching how Packer is normally run by hand.
    pub fn invoke(&self, artifact: &Path) -> KitResult<()> {
        let target = artifact.strip_prefix(&self.work_dir).unwrap_or(artifact);

        println!("Installing Packer plugins...");
        self.step(STEPS[0], target)?;

        println!("Running Packer to build the image...");
        self.step(STEPS[1], target)?;

        Ok(())
    }

    fn step(&self, step: &str, target: &Path) -> KitResult<()> {
        Cmd::new(&self.program)
            .arg(step)
            .arg_path(target)
            .dir(&self.work_dir)
            .run_interactive()
            .map_err(|err| match err {
                KitError::Subprocess { program, code, .. } => KitError::Subprocess {
                    program,
                    step: step.to_string(),
                    code,
                },
                other => other,
            })?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::os::unix::fs::PermissionsExt;
    use tempfile::TempDir;

    /// Fake packer that appends its arguments to `calls.log` and exits with
    /// the given code per sub-command.
    fn fake_packer(dir: &Path, init_code: i32, build_code: i32) -> PathBuf {
        let script = dir.join("fake-packer");
        fs::write(
            &script,
            format!(
                "#!/bin/sh\n\
                 echo \"$@\" >> calls.log\n\
                 case \"$1\" in\n\
                 init) exit {} ;;\n\
                 build) exit {} ;;\n\
                 esac\n",
                init_code, build_code
            ),
        )
        .unwrap();
        fs::set_permissions(&script, fs::Permissions::from_mode(0o755)).unwrap();
        script
    }

    #[test]
    fn test_init_then_build() {
        let tmp = TempDir::new().unwrap();
        let packer = fake_packer(tmp.path(), 0, 0);
        let artifact = tmp.path().join("freebsd-14.1-amd64.pkr.hcl");
        fs::write(&artifact, "").unwrap();

        PackerInvoker::new(packer.to_string_lossy(), tmp.path())
            .invoke(&artifact)
            .unwrap();

        let log = fs::read_to_string(tmp.path().join("calls.log")).unwrap();
        assert_eq!(
            log,
            "init freebsd-14.1-amd64.pkr.hcl\nbuild freebsd-14.1-amd64.pkr.hcl\n"
        );
    }

    #[test]
    fn test_failed_init_skips_build() {
        let tmp = TempDir::new().unwrap();
        let packer = fake_packer(tmp.path(), 2, 0);

        let err = PackerInvoker::new(packer.to_string_lossy(), tmp.path())
            .invoke(&tmp.path().join("t.pkr.hcl"))
            .unwrap_err();

        assert!(matches!(err, KitError::Subprocess { ref step, code: 2, .. } if step == "init"));
        let log = fs::read_to_string(tmp.path().join("calls.log")).unwrap();
        assert_eq!(log.lines().count(), 1);
    }

    #[test]
    fn test_failed_build_reports_step() {
        let tmp = TempDir::new().unwrap();
        let packer = fake_packer(tmp.path(), 0, 5);

        let err = PackerInvoker::new(packer.to_string_lossy(), tmp.path())
            .invoke(&tmp.path().join("t.pkr.hcl"))
            .unwrap_err();

        assert!(err.to_string().contains("build"));
        assert!(err.to_string().contains("exit code 5"));
    }

    #[test]
    fn test_ensure_installed() {
        let tmp = TempDir::new().unwrap();
        assert!(PackerInvoker::new("sh", tmp.path()).ensure_installed().is_ok());

        let err = PackerInvoker::new("nonexistent_packer_12345", tmp.path())
            .ensure_installed()
            .unwrap_err();
        assert!(matches!(err, KitError::Precondition(_)));
        assert!(err.to_string().contains("nonexistent_packer_12345"));
    }
}
