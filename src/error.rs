//! Error types for the image kit.
//!
//! Every variant names the resource that failed (a path, a template field,
//! a program and its exit code) so the operator can act on the message alone.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::template::TemplateError;

/// Result type for kit operations.
pub type KitResult<T> = Result<T, KitError>;

/// Errors produced while resolving, rendering and building.
#[derive(Debug, Error)]
pub enum KitError {
    /// A required program or file is missing.
    #[error("{0}")]
    Precondition(String),

    /// Open/create/read/write/copy failures.
    #[error("failed to {operation} {}: {source}", .path.display())]
    Io {
        /// Operation that triggered the failure.
        operation: &'static str,
        /// Path involved in the failure.
        path: PathBuf,
        /// Underlying IO error.
        source: io::Error,
    },

    /// Template parse or field-resolution failure.
    #[error("template {name}: {source}")]
    Template {
        /// Template name (usually the source path).
        name: String,
        /// Underlying template error.
        source: TemplateError,
    },

    /// Invalid command-line usage.
    #[error("{0}")]
    Usage(String),

    /// External program exited unsuccessfully.
    #[error("'{program} {step}' failed (exit code {code})")]
    Subprocess {
        /// Program that was run.
        program: String,
        /// Sub-command passed to the program.
        step: String,
        /// Exit code, or -1 if terminated by signal.
        code: i32,
    },
}

impl KitError {
    /// Build an IO error for `operation` on `path`.
    pub fn io(operation: &'static str, path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            operation,
            path: path.into(),
            source,
        }
    }

    /// Closure form of [`KitError::io`] for `map_err`.
    pub fn io_at(
        operation: &'static str,
        path: impl Into<PathBuf>,
    ) -> impl FnOnce(io::Error) -> Self {
        let path = path.into();
        move |source| Self::io(operation, path, source)
    }
}
