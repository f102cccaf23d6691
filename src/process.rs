//! External command execution.
//!
//! Commands either capture their output ([`Cmd::run`]) or inherit the
//! caller's stdio so long-running tools stream straight to the terminal
//! ([`Cmd::run_interactive`]). A non-zero exit becomes
//! [`KitError::Subprocess`] unless [`Cmd::allow_fail`] is set.

use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus, Stdio};

use tracing::debug;

use crate::error::{KitError, KitResult};

/// Result of a captured command execution.
#[derive(Debug, Clone)]
pub struct CommandResult {
    /// Exit status of the command.
    pub status: ExitStatus,
    /// Captured stdout as a string.
    pub stdout: String,
    /// Captured stderr as a string.
    pub stderr: String,
}

impl CommandResult {
    /// Returns true if the command exited successfully.
    pub fn success(&self) -> bool {
        self.status.success()
    }

    /// Get stdout, trimmed of whitespace.
    pub fn stdout_trimmed(&self) -> &str {
        self.stdout.trim()
    }
}

/// Builder for configuring command execution.
pub struct Cmd {
    program: String,
    args: Vec<String>,
    current_dir: Option<PathBuf>,
    /// If true, don't fail on non-zero exit.
    allow_fail: bool,
}

impl Cmd {
    /// Create a new command builder.
    pub fn new(program: impl AsRef<str>) -> Self {
        Self {
            program: program.as_ref().to_string(),
            args: Vec::new(),
            current_dir: None,
            allow_fail: false,
        }
    }

    /// Add a single argument.
    pub fn arg(mut self, arg: impl AsRef<str>) -> Self {
        self.args.push(arg.as_ref().to_string());
        self
    }

    /// Add a path as an argument.
    pub fn arg_path(mut self, path: &Path) -> Self {
        self.args.push(path.to_string_lossy().into_owned());
        self
    }

    /// Set the working directory.
    pub fn dir(mut self, dir: &Path) -> Self {
        self.current_dir = Some(dir.to_path_buf());
        self
    }

    /// Allow non-zero exit codes without failing.
    pub fn allow_fail(mut self) -> Self {
        self.allow_fail = true;
        self
    }

    fn command(&self) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args);
        if let Some(ref dir) = self.current_dir {
            cmd.current_dir(dir);
        }
        cmd
    }

    fn check(&self, status: ExitStatus) -> KitResult<()> {
        if self.allow_fail || status.success() {
            return Ok(());
        }
        Err(KitError::Subprocess {
            program: self.program.clone(),
            step: self.args.join(" "),
            code: exit_code(status),
        })
    }

    /// Run the command and capture output.
    pub fn run(self) -> KitResult<CommandResult> {
        debug!(program = %self.program, args = ?self.args, "running");
        let output = self
            .command()
            .output()
            .map_err(KitError::io_at("execute", &self.program))?;

        let result = CommandResult {
            status: output.status,
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        };
        self.check(result.status)?;
        Ok(result)
    }

    /// Run the command with inherited stdio (streaming).
    ///
    /// Blocks until the program exits. Output goes directly to the terminal.
    pub fn run_interactive(self) -> KitResult<ExitStatus> {
        debug!(program = %self.program, args = ?self.args, "running (interactive)");
        let status = self
            .command()
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .status()
            .map_err(KitError::io_at("execute", &self.program))?;

        self.check(status)?;
        Ok(status)
    }
}

fn exit_code(status: ExitStatus) -> i32 {
    status.code().unwrap_or(-1)
}

/// Locate `program` on PATH (or verify an explicit path).
pub fn which(program: &str) -> Option<PathBuf> {
    which::which(program).ok()
}
