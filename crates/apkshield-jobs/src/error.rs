//! # Design
//!
//! - Provide structured, constant-message errors for the protection pipeline.
//! - Capture operation context (paths, reasons, captured output) so failures
//!   are reproducible in tests and actionable for operators.
//! - Keep the four caller-visible kinds (validation, tool execution, timeout,
//!   environment) distinct so the HTTP layer can map status codes directly.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Result type for protection job operations.
pub type JobResult<T> = Result<T, JobError>;

/// Errors produced by the protection job pipeline.
#[derive(Debug, Error)]
pub enum JobError {
    /// The upload or its options failed validation; no subprocess was started.
    #[error("upload rejected")]
    Validation {
        /// Machine-readable rejection code, used as a metrics label.
        code: &'static str,
        /// Human-readable reason surfaced to the caller.
        reason: String,
    },
    /// The external tool ran but failed or produced no usable output.
    #[error("protection tool failed")]
    ToolExecution {
        /// Exit code when the process terminated normally.
        status: Option<i32>,
        /// Captured stderr/stdout surfaced as the failure detail.
        detail: String,
    },
    /// The external tool exceeded the wall-clock ceiling and was terminated.
    #[error("protection tool timed out")]
    Timeout {
        /// Ceiling that was exceeded, in seconds.
        limit_secs: u64,
    },
    /// The runtime or tool artifact required to start the job was missing.
    #[error("protection environment unavailable")]
    Environment {
        /// Component that was missing or unusable.
        what: &'static str,
        /// Human-readable detail for operators.
        detail: String,
    },
    /// IO failures while staging or collecting job files.
    #[error("job io failure")]
    Io {
        /// Operation that triggered the IO failure.
        operation: &'static str,
        /// Path involved in the IO failure.
        path: PathBuf,
        /// Underlying IO error.
        source: io::Error,
    },
}

impl JobError {
    pub(crate) fn validation(code: &'static str, reason: impl Into<String>) -> Self {
        Self::Validation {
            code,
            reason: reason.into(),
        }
    }

    pub(crate) fn io(operation: &'static str, path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            operation,
            path: path.into(),
            source,
        }
    }

    /// Detail string surfaced to the caller alongside the error message.
    #[must_use]
    pub fn detail(&self) -> String {
        match self {
            Self::Validation { reason, .. } => reason.clone(),
            Self::ToolExecution { detail, .. } => detail.clone(),
            Self::Timeout { limit_secs } => {
                format!("processing exceeded the {limit_secs} second limit and was terminated")
            }
            Self::Environment { detail, .. } => detail.clone(),
            Self::Io {
                operation, path, ..
            } => format!("{operation} failed for {}", path.display()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detail_reflects_the_variant() {
        let validation = JobError::validation("bad_extension", "bad extension");
        assert_eq!(validation.detail(), "bad extension");

        let timeout = JobError::Timeout { limit_secs: 300 };
        assert!(timeout.detail().contains("300 second"));

        let io = JobError::io(
            "workspace.create",
            "/tmp/x",
            io::Error::from(io::ErrorKind::PermissionDenied),
        );
        assert!(io.detail().contains("workspace.create"));
    }

    #[test]
    fn messages_stay_constant() {
        assert_eq!(
            JobError::Timeout { limit_secs: 1 }.to_string(),
            "protection tool timed out"
        );
        assert_eq!(
            JobError::validation("other", "x").to_string(),
            "upload rejected"
        );
    }
}
