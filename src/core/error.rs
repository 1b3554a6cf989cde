//! Domain-specific error types for the repository status client.
//!
//! This module defines [`HgSccError`], the single error type returned by every
//! hg-scc operation. It uses `thiserror` for the error definitions and provides
//! constructor helpers for the variants built from several pieces of context.
//!
//! # Public API
//! - [`HgSccError`]: Main error enum covering all failure modes
//! - [`Result<T>`]: Type alias for `std::result::Result<T, HgSccError>`
//!
//! # Error Categories
//! - **Repository lookup**: no `.hg` root found, path outside the working directory
//! - **Process execution**: hg could not be launched, exited non-zero, or was canceled
//! - **Output parsing**: hg output that does not match the expected grammar
//! - **Configuration**: config directory, JSON and diff tool errors

use std::path::PathBuf;
use thiserror::Error;

/// Domain-specific error types for hg-scc
#[derive(Error, Debug)]
pub enum HgSccError {
    // Repository errors
    #[error("No Mercurial repository found at or above {}", .path.display())]
    NoRepository { path: PathBuf },

    #[error("Path is outside the working directory: {}", .path.display())]
    InvalidPath { path: PathBuf },

    // Process errors
    #[error("Failed to launch '{}': {source}", .program.display())]
    Spawn {
        program: PathBuf,
        source: std::io::Error,
    },

    #[error("hg {command} failed ({}): {}", exit_label(.exit_code), .stderr.trim())]
    OperationFailed {
        command: String,
        exit_code: Option<i32>,
        stderr: String,
    },

    #[error("Operation canceled")]
    Canceled,

    // Output parsing errors
    #[error("Unexpected hg output {line:?}: {reason}")]
    ParseError { line: String, reason: String },

    // Configuration errors
    #[error("Could not determine the configuration directory")]
    ConfigDirectoryNotFound,

    #[error("No external diff tool configured")]
    DiffToolNotConfigured,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Convenience type alias for Results using HgSccError
pub type Result<T> = std::result::Result<T, HgSccError>;

fn exit_label(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("exit code {code}"),
        None => "terminated by signal".to_string(),
    }
}

impl HgSccError {
    /// Create a no repository error for the path the lookup started from
    pub fn no_repository(path: impl Into<PathBuf>) -> Self {
        Self::NoRepository { path: path.into() }
    }

    /// Create an invalid path error
    pub fn invalid_path(path: impl Into<PathBuf>) -> Self {
        Self::InvalidPath { path: path.into() }
    }

    /// Create a spawn error for the executable that failed to start
    pub fn spawn(program: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Spawn {
            program: program.into(),
            source,
        }
    }

    /// Create an operation failed error from a finished hg command
    pub fn operation_failed(
        command: impl Into<String>,
        exit_code: Option<i32>,
        stderr: impl Into<String>,
    ) -> Self {
        Self::OperationFailed {
            command: command.into(),
            exit_code,
            stderr: stderr.into(),
        }
    }

    /// Create a parse error for an offending output line
    pub fn parse(line: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::ParseError {
            line: line.into(),
            reason: reason.into(),
        }
    }

    /// True for user-requested aborts, which are not failures
    pub fn is_canceled(&self) -> bool {
        matches!(self, Self::Canceled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_repository_display() {
        let err = HgSccError::no_repository("/tmp/project");
        assert_eq!(
            err.to_string(),
            "No Mercurial repository found at or above /tmp/project"
        );
    }

    #[test]
    fn test_operation_failed_display() {
        let err = HgSccError::operation_failed("commit", Some(255), "abort: nothing changed\n");
        assert_eq!(
            err.to_string(),
            "hg commit failed (exit code 255): abort: nothing changed"
        );
    }

    #[test]
    fn test_operation_failed_without_exit_code() {
        let err = HgSccError::operation_failed("status", None, "");
        assert!(err.to_string().contains("terminated by signal"));
    }

    #[test]
    fn test_parse_error_display() {
        let err = HgSccError::parse("X foo.txt", "unknown status code 'X'");
        assert!(err.to_string().contains("\"X foo.txt\""));
        assert!(err.to_string().contains("unknown status code"));
    }

    #[test]
    fn test_invalid_path_display() {
        let err = HgSccError::invalid_path("../outside.txt");
        assert!(err.to_string().contains("../outside.txt"));
    }

    #[test]
    fn test_spawn_error_keeps_source() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "no such file");
        let err = HgSccError::spawn("/opt/hg/bin/hg", io_err);
        assert!(err.to_string().contains("/opt/hg/bin/hg"));
        assert!(err.to_string().contains("no such file"));
    }

    #[test]
    fn test_is_canceled() {
        assert!(HgSccError::Canceled.is_canceled());
        assert!(!HgSccError::DiffToolNotConfigured.is_canceled());
    }
}
